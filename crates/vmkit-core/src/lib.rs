#![forbid(unsafe_code)]

//! Core: observable nodes, observer lists, observable lists, and decorators.
//!
//! Everything here is single-threaded and synchronous. A mutation stores its
//! new state, then notifies observers in-line before the call returns; any
//! cascade it triggers completes depth-first inside that same call.

pub mod decorator;
pub mod error;
pub mod list;
pub mod node;
pub mod notify;

pub use decorator::{
    DECORATORS, Decorator, DecoratorHost, DecoratorRegistry, Hidden, LimitRange, Precision,
    RangeDecorator, ReadOnly, Step, Unit, WarningRange,
};
pub use error::{Result, VmError};
pub use list::{ListChange, ObservableList};
pub use node::{Node, NodeRef, NodeType, ObservableNode};
pub use notify::{NodeId, Observers, PropertyChanged, SubscriptionId};
