//! Nullable event sink — captures everything handed to it.

use std::sync::{Arc, Mutex};

/// Collects items pushed through listener callbacks.
///
/// `listener()` hands out a boxed callback suitable for an event bus; every
/// clone of the recorder sees the same captured items.
#[derive(Debug)]
pub struct Recorder<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A callback that appends a clone of each item it receives.
    pub fn listener(&self) -> Box<dyn Fn(&T) + Send + Sync> {
        let items = Arc::clone(&self.items);
        Box::new(move |item: &T| {
            items.lock().unwrap().push(item.clone());
        })
    }

    /// Everything captured so far.
    pub fn items(&self) -> Vec<T> {
        self.items.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + 'static> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_captures_in_order() {
        let recorder: Recorder<u32> = Recorder::new();
        let listener = recorder.listener();
        listener(&1);
        listener(&2);
        assert_eq!(recorder.items(), vec![1, 2]);
        assert_eq!(recorder.clone().len(), 2);
    }
}
