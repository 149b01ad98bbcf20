//! `slipway graph` command

use std::collections::HashSet;

use anyhow::Result;

use crate::cli::{GlobalArgs, GraphArgs};
use slipway::core::PackageId;
use slipway::ops::{resolve_project, EvalOptions, Evaluated};
use slipway::resolver::PackageGraph;

pub fn execute(globals: &GlobalArgs, args: GraphArgs) -> Result<()> {
    let ctx = super::context(globals)?;

    let opts = EvalOptions {
        settings: args.settings,
        options: args.options,
    };
    let evaluated = resolve_project(&ctx, &opts)?;

    print!("{}", render(&evaluated));
    Ok(())
}

fn render(evaluated: &Evaluated) -> String {
    let mut out = String::new();

    let graph = &evaluated.resolution.graph;
    let Some(root) = graph.root() else {
        return out;
    };

    out.push_str(&format!("{} ({})\n", root, evaluated.snapshot));

    let mut seen = HashSet::new();
    seen.insert(root.clone());
    render_deps(graph, root, 1, &mut seen, &mut out);

    let test_graph = &evaluated.resolution.test_graph;
    if !test_graph.is_empty() {
        out.push_str("[test]\n");
        for (id, _) in test_graph.packages() {
            out.push_str(&format!("├── {}\n", id));
        }
    }

    out
}

fn render_deps(
    graph: &PackageGraph,
    id: &PackageId,
    depth: usize,
    seen: &mut HashSet<PackageId>,
    out: &mut String,
) {
    for dep in graph.deps(id) {
        let duplicate = seen.contains(&dep);
        let marker = if duplicate { " (*)" } else { "" };
        out.push_str(&format!(
            "{}├── {}{}\n",
            "│   ".repeat(depth - 1),
            dep,
            marker
        ));

        // Don't expand the same package twice
        if duplicate {
            continue;
        }
        seen.insert(dep.clone());
        render_deps(graph, &dep, depth + 1, seen, out);
    }
}
