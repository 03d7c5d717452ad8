mod selector;

pub use self::selector::Selector;
