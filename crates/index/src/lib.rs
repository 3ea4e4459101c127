//! Sluice Index - Ordered views for Sluice half-joins.
//!
//! This crate provides the ordered-index collaborator consumed by half-joins:
//!
//! - `Organizer`: A multi-attribute comparison order
//! - `OrderedView`: A sorted view of a changing set with batch equality lookup
//! - `SortedView`: An `OrderedView` backed by a sorted vector
//!
//! # Example
//!
//! ```rust
//! use sluice_core::Record;
//! use sluice_index::{OrderedView, Organizer, SortedView};
//!
//! let mut view = SortedView::new(Organizer::ascending(["id"]));
//! view.add(&[Record::from([("id", 2)]), Record::from([("id", 1)])]);
//!
//! let mut probes = vec![Record::from([("id", 2)]), Record::from([("id", 7)])];
//! view.organizer().sort(&mut probes);
//!
//! let located = view.locate(&probes, true);
//! assert!(located[0].found);
//! assert!(!located[1].found);
//! ```

#![no_std]

extern crate alloc;

pub mod comparator;
pub mod sorted;
pub mod traits;

pub use comparator::{Comparator, Order, Organizer, SortKey};
pub use sorted::SortedView;
pub use traits::{Location, OrderedView};
