//! Build a small scene and report what sits under a few pointer positions.
//!
//! Run with `RUST_LOG=hitpath=debug cargo run --example pick --features tracing`
//! to see geometry and hit-test logging.

use std::cell::RefCell;
use std::rc::Rc;

use hitpath::{AttrUpdate, MarkerSymbol, RecordingContext, RenderContext, Scene, Shape, dvec2};
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let ctx: Rc<RefCell<dyn RenderContext>> = Rc::new(RefCell::new(RecordingContext::new()));
    let mut scene = Scene::new();
    scene.set_context(ctx);

    let root = scene.root();
    let panel = scene.add_group(root)?;
    scene.translate(panel, 50.0, 20.0)?;

    let mut square = Shape::path("M0,0 L40,0 L40,40 L0,40 Z");
    square.apply(AttrUpdate::new().fill("steelblue").stroke("black").line_width(2.0))?;
    let square = scene.add_shape(panel, square)?;

    let mut wire = Shape::path("M0 60 C20 40 40 80 60 60");
    wire.apply(AttrUpdate::new().stroke("gray").line_width(3.0).arrow(true))?;
    let wire = scene.add_shape(panel, wire)?;

    let mut dot = Shape::marker(dvec2(20.0, 20.0), 5.0)?;
    dot.apply(AttrUpdate::new().symbol(MarkerSymbol::Diamond).fill("orange"))?;
    let dot = scene.add_shape(panel, dot)?;

    let mut broken = Shape::path("L10 10");
    broken.apply(AttrUpdate::new().stroke("red"))?;
    if let Some(err) = broken.path_diagnostic() {
        let mut rendered = String::new();
        if miette::GraphicalReportHandler::new()
            .render_report(&mut rendered, err)
            .is_ok()
        {
            eprintln!("{rendered}");
        }
    }

    for id in [square, wire, dot] {
        scene.on(id, "click", move |e| {
            println!("  {} clicked at {:?}", id, e.point);
        })?;
    }
    scene.on(panel, "click", |e| {
        println!("  panel saw click from {:?}", e.target());
    })?;

    for (x, y) in [(70.0, 40.0), (60.0, 30.0), (75.0, 80.0), (200.0, 200.0)] {
        println!("pointer at ({x}, {y})");
        if scene.fire_at("click", x, y).is_none() {
            println!("  nothing here");
        }
    }

    let mut out = RecordingContext::new();
    scene.render(&mut out);
    println!("\n{}", out.dump());
    Ok(())
}
