//! Object arena.
//!
//! Every string created while a VM is alive, whether from a literal or from
//! concatenation, is interned here and stays owned by the heap until
//! [`Heap::free`] releases all of them at once.

use super::table::Table;
use super::value::{ObjString, Value, hash_string};
use log::trace;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<Rc<ObjString>>,
    strings: Table,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interned string for `chars`, allocating only if the content is new.
    pub fn intern(&mut self, chars: &str) -> Rc<ObjString> {
        let hash = hash_string(chars.as_bytes());
        if let Some(existing) = self.strings.find_string(chars, hash) {
            return existing;
        }
        self.allocate(ObjString::with_hash(chars.into(), hash))
    }

    /// Like [`Heap::intern`] but takes ownership of an already built buffer.
    pub fn take_string(&mut self, chars: String) -> Rc<ObjString> {
        let hash = hash_string(chars.as_bytes());
        if let Some(existing) = self.strings.find_string(&chars, hash) {
            return existing;
        }
        self.allocate(ObjString::with_hash(chars.into_boxed_str(), hash))
    }

    fn allocate(&mut self, string: ObjString) -> Rc<ObjString> {
        let object = Rc::new(string);
        self.objects.push(Rc::clone(&object));
        self.strings.set(Rc::clone(&object), Value::Nil);
        object
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn strings(&self) -> &Table {
        &self.strings
    }

    /// Release every owned object.
    pub fn free(&mut self) {
        trace!("freeing {} heap objects", self.objects.len());
        self.strings.clear();
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut heap = Heap::new();
        let a = heap.intern("hello");
        let b = heap.intern("hello");
        let c = heap.take_string(String::from("hel") + "lo");
        assert!(Rc::ptr_eq(&a, &b));
        assert!(Rc::ptr_eq(&a, &c));
        assert_eq!(heap.object_count(), 1);
        assert!(heap.strings().contains("hello"));
    }

    #[test]
    fn test_distinct_contents_are_distinct_objects() {
        let mut heap = Heap::new();
        let a = heap.intern("a");
        let b = heap.intern("b");
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(heap.object_count(), 2);
    }

    #[test]
    fn test_free_releases_everything() {
        let mut heap = Heap::new();
        let kept = heap.intern("kept");
        heap.intern("other");
        heap.free();
        assert_eq!(heap.object_count(), 0);
        assert!(heap.strings().is_empty());
        // only the handle held here survives
        assert_eq!(Rc::strong_count(&kept), 1);
    }
}
