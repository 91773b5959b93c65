mod cli;

use clap::Parser;
use cli::{Cli, Command};
use mvnforge_model::{builder, enumerator, Environment};
use mvnforge_util::errors::MvnResult;
use mvnforge_util::progress;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> MvnResult<()> {
    init_tracing();
    let cli = Cli::parse();
    let env = Environment::load()?;

    match cli.command {
        Command::Describe { gav } => describe(&gav, &env),
        Command::Resolve { gav, transitive } => resolve(&gav, transitive, &env),
        Command::Tree { gav } => tree(&gav, &env),
    }
}

fn describe(gav: &str, env: &Environment) -> MvnResult<()> {
    let component = cli::parse_gav(gav)?;
    let model = builder::build(&component, env)?;
    progress::status("Describing", &component.to_string());
    println!("packaging: {}", model.packaging);
    println!("properties: {}", model.properties.len());
    println!("dependencyManagement entries: {}", model.dependency_management.len());
    println!("dependencies:");
    for dep in &model.dependencies {
        println!("  {dep}");
    }
    Ok(())
}

fn resolve(gav: &str, transitive: bool, env: &Environment) -> MvnResult<()> {
    let component = cli::parse_gav(gav)?;
    let model = builder::build(&component, env)?;

    progress::status(
        "Resolving",
        &format!("{component} ({})", if transitive { "transitive" } else { "direct" }),
    );
    let result = enumerator::enumerate(&model, env, transitive)?;
    for dep in &result.resolved {
        println!("{:depth$}{} [{}]", "", dep.component, dep.scope, depth = dep.depth * 2);
    }
    if !result.conflicts.is_empty() {
        progress::status_warn("Conflicts", &format!("{} version conflicts", result.conflicts.conflicts.len()));
        for conflict in &result.conflicts.conflicts {
            println!(
                "  {} -> chosen {} (losers: {:?})",
                conflict.project, conflict.chosen_version, conflict.losing_versions
            );
        }
    }
    Ok(())
}

fn tree(gav: &str, env: &Environment) -> MvnResult<()> {
    let component = cli::parse_gav(gav)?;
    let model = builder::build(&component, env)?;
    let result = enumerator::enumerate(&model, env, true)?;

    println!("{component}");
    if let Some(root_idx) = result.graph.root_index(&component.project) {
        print_subtree(&result.graph, root_idx, 1);
    }
    Ok(())
}

fn print_subtree(graph: &mvnforge_model::DependencyGraph, idx: petgraph::graph::NodeIndex, depth: usize) {
    for (child, scope) in graph.children_of(idx) {
        println!("{:indent$}+- {child} [{scope}]", "", indent = depth * 2);
        if let Some(child_idx) = graph.root_index(&child.project) {
            print_subtree(graph, child_idx, depth + 1);
        }
    }
}
