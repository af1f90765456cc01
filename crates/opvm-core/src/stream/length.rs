//! Length query/set for streams that back protected blobs.

use std::fs::File;
use std::io::{self, Cursor};

pub trait StreamLength {
    fn byte_len(&mut self) -> io::Result<u64>;
    fn set_byte_len(&mut self, len: u64) -> io::Result<()>;
}

impl StreamLength for File {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn set_byte_len(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl StreamLength for Cursor<Vec<u8>> {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn set_byte_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length exceeds address space"))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

impl<T: StreamLength + ?Sized> StreamLength for &mut T {
    fn byte_len(&mut self) -> io::Result<u64> {
        (**self).byte_len()
    }

    fn set_byte_len(&mut self, len: u64) -> io::Result<()> {
        (**self).set_byte_len(len)
    }
}
