//! Spatial transition modal
//!
//! Headless core of the book detail view: a panel that lifts out of the
//! clicked card, opens in timed phases, crossfades between books while
//! open, and lands back on a visible card when it closes.
//!
//! - `geometry`: card rectangles → [`OriginPosition`], the [`ElementLocator`] seam
//! - `transform`: origin → translate+scale of the panel
//! - `machine`: the [`SpatialModal`] phase state machine
//! - `navigation`: prev/next over the filtered list
//! - `crossfade`: displayed-book swap while open
//! - `recent`: random pick without immediate repeats
//! - `scheduler`: cancelable deferred steps over an injected [`Clock`]
//! - `scroll_lock`: the shared background scroll flag

pub mod crossfade;
pub mod geometry;
pub mod machine;
pub mod navigation;
pub mod recent;
pub mod scheduler;
pub mod scroll_lock;
pub mod transform;

pub use crossfade::{Crossfade, FadeStage};
pub use geometry::{ElementLocator, ElementRect, OriginPosition, Rect, Viewport};
pub use machine::{AnimationPhase, ModalEvent, ModalKey, ModalTimings, SpatialModal};
pub use navigation::{Direction, NavigationContext};
pub use recent::RecentSelections;
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock, TimerToken};
pub use scroll_lock::ScrollLock;
pub use transform::{PanelSize, Transform};
