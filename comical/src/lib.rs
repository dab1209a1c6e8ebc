// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Comical: an editable speech-bubble overlay for comic pages.
//!
//! Bubbles are drawn around content elements of a host document and described by a JSON
//! [`BubbleSpec`] stored on each element. A [`Session`] keeps one drawing surface per container
//! being edited and provides:
//!
//! - z-order layering: each distinct `level` gets a pair of layers (outlines below, bodies
//!   above), so bubbles of one level merge into a single shape while higher levels paint on top;
//! - family relationships: bubbles sharing a level are chained by `order`
//!   ([`Session::find_parent`], [`Session::find_child`], [`Session::initialize_child`]);
//! - hit testing ([`Session::get_bubble_hit`], [`Session::something_hit`]);
//! - tail placement that steers clear of content ([`Session::move_point_outside_bubble_content`]);
//! - an active bubble with draggable tail handles;
//! - baking a container into a static SVG image ([`Session::convert_canvas_to_svg_img`]).
//!
//! The document itself is reached only through the [`Host`] trait. [`MemoryHost`] is a
//! self-contained implementation for tests and headless use.
//!
//! ```rust
//! use comical::{BubbleSpec, MemoryHost, Session};
//! use kurbo::{Point, Rect};
//!
//! let mut host = MemoryHost::new();
//! let page = host.add_element(None, Rect::new(0.0, 0.0, 400.0, 300.0));
//! let first = host.add_element(Some(page), Rect::new(20.0, 20.0, 120.0, 60.0));
//! let second = host.add_element(Some(page), Rect::new(200.0, 120.0, 300.0, 160.0));
//! host.set_spec(first, &BubbleSpec::new("speech"));
//!
//! let mut session = Session::new();
//! session.start_editing(&mut host, &[page]);
//! session.initialize_child(&mut host, second, first).unwrap();
//! session.update(&mut host, page).unwrap();
//!
//! assert_eq!(session.find_parent(second), Some(first));
//! assert_eq!(session.get_bubble_hit(page, Point::new(70.0, 40.0)).map(|b| b.content()), Some(first));
//!
//! session.stop_editing(&mut host);
//! assert!(host.static_image(page).is_some());
//! assert_eq!(host.observer_count(), 0);
//! ```

pub mod avoid;
mod bubble;
mod config;
mod container;
mod error;
pub mod family;
pub mod gesture;
mod host;
mod layering;
mod link;
pub mod memory;
pub mod query;
mod session;

pub use bubble::{Bubble, BubbleLayers, default_mid};
pub use config::SessionConfig;
pub use container::{ContainerData, ItemMeta, ItemRole};
pub use error::Error;
pub use host::{ElementId, Host, ObserverToken, read_spec, write_spec};
pub use layering::LayerPair;
pub use memory::MemoryHost;
pub use session::{ActiveBubbleListener, DragTarget, HandlePart, PointerOutcome, Session};

pub use comical_spec::{BUBBLE_ATTRIBUTE, BubbleSpec, CURRENT_VERSION, DEFAULT_STYLE, SpecError, TailSpec};
