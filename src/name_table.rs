//! Interned UTF-16→UTF-8 name cache: convert once,
//! hand back a shared handle on every later lookup of the same bytes.

use std::cell::RefCell;
use std::rc::Rc;

use fxhash::FxHashMap;

#[derive(Default)]
pub struct NameTable {
	cache: RefCell<FxHashMap<Vec<u16>, Rc<str>>>,
}

impl NameTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn intern(&self, raw: &[u16]) -> Rc<str> {
		if let Some(hit) = self.cache.borrow().get(raw) {
			return hit.clone();
		}
		let decoded: Rc<str> = Rc::from(String::from_utf16_lossy(raw));
		self.cache.borrow_mut().insert(raw.to_vec(), decoded.clone());
		decoded
	}
}
