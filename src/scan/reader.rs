use crate::Byte;
use crate::Offset;

/// A slice of the buffer read at `offset`. `end_of_buffer` is set when the
/// window reaches the end of the buffer, in which case `bytes` may be
/// shorter than requested, or empty when reading past the end.
#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) struct Window<'buffer> {
    pub(crate) offset: Offset,
    pub(crate) bytes: &'buffer [Byte],
    pub(crate) end_of_buffer: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct BoundedReader<'buffer> {
    buffer: &'buffer [Byte],
}

impl<'buffer> BoundedReader<'buffer> {
    pub(crate) fn new(buffer: &'buffer [Byte]) -> Self {
        Self { buffer }
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn read(&self, offset: Offset, size: usize) -> Window<'buffer> {
        let start = offset.min(self.buffer.len());
        let end = offset.saturating_add(size).min(self.buffer.len());
        Window {
            offset,
            bytes: &self.buffer[start..end],
            end_of_buffer: end == self.buffer.len(),
        }
    }

    /// Consecutive windows of `size` bytes starting at `offset`, the last
    /// one being the window that reaches the end of the buffer.
    pub(crate) fn windows(&self, offset: Offset, size: usize) -> Windows<'buffer> {
        self.overlapping_windows(offset, size, size)
    }

    /// Windows of `size` bytes that start `step` bytes apart. With
    /// `step < size`, consecutive windows share `size - step` bytes, so
    /// that patterns shorter than the overlap are never split.
    pub(crate) fn overlapping_windows(
        &self,
        offset: Offset,
        size: usize,
        step: usize,
    ) -> Windows<'buffer> {
        Windows {
            reader: *self,
            offset,
            size,
            step: step.max(1),
            done: false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Windows<'buffer> {
    reader: BoundedReader<'buffer>,
    offset: Offset,
    size: usize,
    step: usize,
    done: bool,
}

impl<'buffer> Iterator for Windows<'buffer> {
    type Item = Window<'buffer>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let window = self.reader.read(self.offset, self.size);
        self.done = window.end_of_buffer;
        self.offset = self.offset.saturating_add(self.step);
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_valid() {
        let reader = BoundedReader::new(b"%PDF-1.4\n%%EOF");
        assert_eq!(
            reader.read(0, 8),
            Window {
                offset: 0,
                bytes: b"%PDF-1.4",
                end_of_buffer: false
            }
        );
        // Short read at the end of the buffer
        assert_eq!(
            reader.read(9, 100),
            Window {
                offset: 9,
                bytes: b"%%EOF",
                end_of_buffer: true
            }
        );
        // An exact fit still reports the end of the buffer
        assert!(reader.read(9, 5).end_of_buffer);
    }

    #[test]
    fn read_past_end() {
        let reader = BoundedReader::new(b"xref");
        let window = reader.read(10, 4);
        assert!(window.bytes.is_empty());
        assert!(window.end_of_buffer);
        let window = reader.read(usize::MAX, 4);
        assert!(window.bytes.is_empty());
        assert!(window.end_of_buffer);
    }

    #[test]
    fn windows_valid() {
        let reader = BoundedReader::new(b"0123456789");
        let windows: Vec<_> = reader.windows(0, 4).map(|window| window.bytes).collect();
        assert_eq!(
            windows,
            vec![b"0123".as_slice(), b"4567".as_slice(), b"89".as_slice()]
        );

        let windows: Vec<_> = reader
            .overlapping_windows(2, 4, 3)
            .map(|window| window.bytes)
            .collect();
        assert_eq!(
            windows,
            vec![b"2345".as_slice(), b"5678".as_slice(), b"89".as_slice()]
        );

        // Empty buffers yield a single empty window
        let reader = BoundedReader::new(b"");
        assert_eq!(reader.windows(0, 4).count(), 1);
    }
}
