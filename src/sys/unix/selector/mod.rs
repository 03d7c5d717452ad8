// The only readiness primitive every unix provides takes a flat array of
// descriptors, which maps directly onto the subscription list.
mod poll;

pub use self::poll::Selector;
