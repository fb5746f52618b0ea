use thiserror::Error;

macro_rules! impl_read_at {
    ($fn_name:ident, $typ:ty) => {
        pub fn $fn_name(&self, offset: usize) -> Result<$typ, FontBufferError> {
            let size = size_of::<$typ>();
            let bytes = self.get(offset, size)?;

            Ok(<$typ>::from_be_bytes(bytes.try_into().unwrap()))
        }
    };
}

/// Represents the possible errors that can occur when reading from a `FontBuffer`.
#[derive(Error, Debug)]
pub enum FontBufferError {
    /// A read was attempted at an offset where the requested number of
    /// bytes does not fit inside the font buffer.
    #[error("a read of {len} bytes at offset {offset} falls outside the {size} byte font buffer")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },
}

/// A struct which encapsulates the raw font bytes and provides
/// bounds-checked big-endian reads at arbitrary offsets.
///
/// TrueType tables reference one another by byte offset, so reads hop
/// around the buffer rather than advancing through it. Every accessor
/// verifies that the requested range lies inside the buffer and fails
/// with [`FontBufferError::OutOfBounds`] otherwise; no read is ever
/// performed past the end, no matter what offsets the font declares.
pub struct FontBuffer<'a> {
    data: &'a [u8],
}

impl<'a> FontBuffer<'a> {
    /// Wraps an already-resident font binary. The buffer is borrowed for
    /// the lifetime of the reader and never copied or mutated.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the `len` bytes starting at `offset`.
    ///
    /// # Examples
    ///
    /// ```
    /// use glyphmap::buffer::FontBuffer;
    ///
    /// let data = [0x63, 0x6D, 0x61, 0x70, 0x00, 0x01];
    /// let buffer = FontBuffer::new(&data);
    ///
    /// assert_eq!(buffer.get(0, 4).unwrap(), b"cmap");
    /// assert!(buffer.get(4, 4).is_err());
    /// ```
    pub fn get(&self, offset: usize, len: usize) -> Result<&'a [u8], FontBufferError> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(FontBufferError::OutOfBounds {
                offset,
                len,
                size: self.data.len(),
            })
    }

    impl_read_at!(read_i32_at, i32);
    impl_read_at!(read_u32_at, u32);
    impl_read_at!(read_i16_at, i16);
    impl_read_at!(read_u16_at, u16);
    impl_read_at!(read_i8_at, i8);
    impl_read_at!(read_u8_at, u8);
    impl_read_at!(read_i64_at, i64);
}

impl std::fmt::Debug for FontBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "FontBuffer({} bytes)", self.data.len())
    }
}
