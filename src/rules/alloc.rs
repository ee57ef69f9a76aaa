//! Table allocation boundary.
//!
//! The host engine may pool or align lookup tables; the decoder asks for
//! zeroed byte buffers of a given length through this trait and never
//! allocates rule tables behind its back.

pub trait TableAllocator: Send {
    /// Return a zeroed buffer of exactly `len` bytes.
    fn allocate(&mut self, len: usize) -> Box<[u8]>;
}

/// Plain heap allocation.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapAllocator;

impl TableAllocator for HeapAllocator {
    fn allocate(&mut self, len: usize) -> Box<[u8]> {
        vec![0u8; len].into_boxed_slice()
    }
}

/// Copy `src` into a freshly allocated buffer.
pub(crate) fn allocate_copy(alloc: &mut dyn TableAllocator, src: &[u8]) -> Box<[u8]> {
    let mut buf = alloc.allocate(src.len());
    buf.copy_from_slice(src);
    buf
}
