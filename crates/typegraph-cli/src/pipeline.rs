//! Core processing pipeline: compile rules → load → discover → resolve → export.

use std::time::Instant;

use tracing::info;

use typegraph_core::{CriteriaSet, Result, TypeProvider, build_type_graph};
use typegraph_go::{GoModule, GoProgram};

use crate::output::{render_artifact, write_description};
use crate::{RunReport, TypegraphOptions};

/// Run typegraph end to end.
///
/// 1. Check options and compile include/exclude rules (a bad rule aborts
///    before anything is loaded)
/// 2. Load the root packages and their imports
/// 3. Discover entities and resolve references
/// 4. Write the graph description
/// 5. Render it with Graphviz (if requested)
pub fn run_main(opts: &TypegraphOptions) -> Result<RunReport> {
    let total_start = Instant::now();

    // 1. Options and rules
    opts.validate()?;
    let criteria = CriteriaSet::from_patterns(&opts.includes, &opts.excludes)?;
    info!(
        includes = criteria.inclusions().len(),
        excludes = criteria.exclusions().len(),
        "compiled rules"
    );

    // 2. Load
    let module = GoModule::discover(&opts.dir)?;
    let program = GoProgram::load_from(&module, &opts.dir, &opts.namespaces)?;
    let criteria = criteria.with_roots(program.root_namespaces().iter().cloned());

    // 3. Build graph
    let graph = build_type_graph(&program, &criteria)?;

    // 4. Description
    let description = write_description(opts, &graph)?;

    // 5. Render
    let artifact = render_artifact(opts, &description)?;

    info!(
        "Total time: {:.2}s",
        total_start.elapsed().as_secs_f64()
    );

    Ok(RunReport {
        graph,
        description,
        artifact,
    })
}
