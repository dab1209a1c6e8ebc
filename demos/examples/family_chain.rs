// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building a chain of joined bubbles, dragging a tail, and baking the page.
//!
//! Run:
//! - `cargo run -p comical_demos --example family_chain`

use comical::{ElementId, MemoryHost, PointerOutcome, Session, TailSpec};
use comical_spec::BubbleSpec;
use kurbo::{Point, Rect};

fn main() {
    let mut host = MemoryHost::new();
    let page = host.add_element(None, Rect::new(0.0, 0.0, 600.0, 400.0));

    // One speaking bubble, three more that continue the same speech.
    let mut first = BubbleSpec::new("speech");
    first.tails.push(TailSpec::new(
        Point::new(60.0, 360.0),
        Point::new(80.0, 240.0),
        false,
    ));
    let root = host.add_element(Some(page), Rect::new(40.0, 40.0, 160.0, 90.0));
    host.set_spec(root, &first);
    let followers: Vec<ElementId> = (1..4)
        .map(|i| {
            let x = 40.0 + 140.0 * i as f64;
            let y = 40.0 + 50.0 * i as f64;
            host.add_element(Some(page), Rect::new(x, y, x + 110.0, y + 45.0))
        })
        .collect();

    let mut session = Session::new();
    session.set_active_bubble_listener(Some(Box::new(|active: Option<ElementId>| {
        println!("active bubble: {active:?}");
    })));
    session.start_editing(&mut host, &[page]);

    let mut parent = root;
    for &child in &followers {
        if let Err(err) = session.initialize_child(&mut host, child, parent) {
            println!("link failed: {err}");
            continue;
        }
        // Linking only rewrites descriptions; redraw afterwards.
        let _ = session.update(&mut host, page);
        parent = child;
    }

    println!("\n== Family ==");
    for &el in std::iter::once(&root).chain(&followers) {
        let bubble = session.bubble(el).expect("bubble was just built");
        println!(
            "{el:?}: level {} order {:?} parent {:?} child {:?}",
            bubble.level(),
            bubble.order(),
            session.find_parent(el),
            session.find_child(el),
        );
    }
    println!("last in family: {:?}", session.get_last_in_family(root));

    println!("\n== Hits ==");
    for pt in [Point::new(100.0, 65.0), Point::new(330.0, 155.0), Point::new(580.0, 20.0)] {
        let hit = session.get_bubble_hit(page, pt).map(|b| b.content());
        println!("({:.0}, {:.0}) -> {hit:?}", pt.x, pt.y);
    }

    println!("\n== Drag ==");
    session.activate_element(Some(root));
    for outcome in [
        session.pointer_down(page, Point::new(60.0, 360.0)),
        session.pointer_move(page, Point::new(200.0, 120.0)),
        session.pointer_up(&mut host, page, Point::new(200.0, 120.0)),
    ] {
        if let PointerOutcome::Dragged(_, at) = outcome {
            println!("tip kept off content at ({:.0}, {:.0})", at.x, at.y);
        }
        println!("{outcome:?}");
    }

    session.stop_editing(&mut host);
    println!("\n== Baked ==");
    println!("{}", host.static_image(page).unwrap_or("<none>"));
    println!("live observers: {}", host.observer_count());
}
