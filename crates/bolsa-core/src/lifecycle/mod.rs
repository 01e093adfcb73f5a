//! Offer and application lifecycles, plus the profile activity links.
//!
//! Each book keeps a local cache of what the views display and runs the
//! Authorization Guard before every mutation. A denied or locally detectable
//! failure (duplicate, closed, missing) never reaches the backend. Concurrent
//! mutations are not serialized: whichever response lands last is what the
//! cache holds.

mod activities;
mod applications;
mod offers;

pub use activities::ActivityBook;
pub use applications::ApplicationBook;
pub use offers::OfferBook;
