//! figedit - interactive figure editing for image annotation
//!
//! An engine for drawing and editing bounding boxes, keypoint groups,
//! per-label segmentation masks and review markers on images or video
//! frames. Hosts feed pointer and key events to a
//! [`FigureController`](controller::FigureController), which keeps an undo
//! history of full snapshots, loads and saves items through an
//! [`ItemRepository`](persistence::ItemRepository), and describes each frame
//! to a host [`Renderer`](render::Renderer).

pub mod codec;
pub mod config;
pub mod constants;
pub mod controller;
pub mod geometry;
pub mod history;
pub mod keybindings;
pub mod model;
pub mod persistence;
pub mod render;

pub use controller::{EditorSettings, EventOutcome, FigureController, InputEvent, KeyCommand};
pub use model::{AnnotatedItem, Figure, FigureType, ItemId, LabelClass, LabelSet};
pub use persistence::{ItemRepository, StorageError};
