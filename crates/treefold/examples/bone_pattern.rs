//! Build the bone design and print a crease summary plus its FOLD document.
//!
//! Run with `cargo run -p treefold --example bone_pattern`.

use treefold::fold::fold_document;
use treefold::samples;

fn main() {
    let design = samples::bone().expect("bone sample");
    let g = design.crease_pattern().expect("bone folds");
    let [m, v, u, _, b] = g.assignment_histogram();
    println!(
        "nodes={} edges={} faces={} molecules={}",
        g.graph().node_count(),
        g.graph().edge_count(),
        g.faces().len(),
        g.molecules().len()
    );
    println!("mountain={m} valley={v} unfolded={u} boundary={b}");

    let doc = fold_document(&g, false);
    match serde_json::to_string_pretty(&doc) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("serialize: {e}"),
    }
}
