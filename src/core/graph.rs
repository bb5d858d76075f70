//! Command graph
//!
//! The fixed DAG of build commands. Each command declares its direct
//! prerequisites, its tracked options, and its tracked files; the graph
//! resolves a target into the dependency-ordered chain of commands the
//! runner must consider.
//!
//! The graph is static for a given tool version. Acyclicity is still
//! checked at construction: a cycle means a defect in the tool itself,
//! and must fail loudly rather than hang resolution.

use std::path::PathBuf;

use walkdir::WalkDir;

use crate::core::options::{ResolvedOptions, TrackedOption};
use crate::core::paths::ProjectPaths;
use crate::error::GraphError;

/// Identifier of one build command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandId {
    /// Resolve dependencies with the package manager (Conan)
    Deps,
    /// Generate build files (CMake configure)
    Generate,
    /// Compile the selected flavor
    Build,
    /// Run the test suite
    Test,
    /// Install the selected flavor
    Install,
}

impl CommandId {
    /// Command name as shown to the user and used in store keys
    pub fn name(self) -> &'static str {
        match self {
            CommandId::Deps => "deps",
            CommandId::Generate => "generate",
            CommandId::Build => "build",
            CommandId::Test => "test",
            CommandId::Install => "install",
        }
    }
}

/// Static declaration of one command
#[derive(Debug)]
pub struct CommandSpec {
    pub id: CommandId,
    /// Direct prerequisites, in declaration order
    pub prereqs: &'static [CommandId],
    /// Options whose values participate in this command's fingerprint
    pub tracked_options: &'static [TrackedOption],
}

impl CommandSpec {
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// Files whose content participates in this command's fingerprint.
    ///
    /// The parallelism limit is deliberately absent from every tracked
    /// set: it cannot change what the tools produce.
    pub fn tracked_files(&self, paths: &ProjectPaths, opts: &ResolvedOptions) -> Vec<PathBuf> {
        match self.id {
            CommandId::Deps => {
                let mut files: Vec<PathBuf> = paths.recipe_candidates().into();
                files.push(paths.conan_profile(&opts.profile));
                files
            }
            CommandId::Generate => vec![paths.cmake_lists()],
            CommandId::Build | CommandId::Test | CommandId::Install => {
                let mut files = vec![paths.cmake_lists()];
                files.extend(source_tree(paths));
                files
            }
        }
    }
}

/// Walk the conventional source subdirectories, deterministically ordered.
fn source_tree(paths: &ProjectPaths) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for subdir in ["src", "include", "tests", "cmake"] {
        let root = paths.source_dir.join(subdir);
        if !root.is_dir() {
            continue;
        }
        let walk = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file());
        files.extend(walk.map(walkdir::DirEntry::into_path));
    }
    files
}

const SPECS: &[CommandSpec] = &[
    CommandSpec {
        id: CommandId::Deps,
        prereqs: &[],
        tracked_options: &[
            TrackedOption::Flavor,
            TrackedOption::Profile,
            TrackedOption::ConanOptions,
        ],
    },
    CommandSpec {
        id: CommandId::Generate,
        prereqs: &[CommandId::Deps],
        tracked_options: &[
            TrackedOption::Flavor,
            TrackedOption::Generator,
            TrackedOption::Shared,
            TrackedOption::Tests,
            TrackedOption::CmakeVariables,
            TrackedOption::Prefix,
        ],
    },
    CommandSpec {
        id: CommandId::Build,
        prereqs: &[CommandId::Generate],
        tracked_options: &[TrackedOption::Flavor, TrackedOption::Target],
    },
    CommandSpec {
        id: CommandId::Test,
        prereqs: &[CommandId::Build],
        tracked_options: &[TrackedOption::Flavor],
    },
    CommandSpec {
        id: CommandId::Install,
        prereqs: &[CommandId::Build],
        tracked_options: &[TrackedOption::Flavor, TrackedOption::Prefix],
    },
];

/// The command DAG, validated at construction
#[derive(Debug)]
pub struct CommandGraph {
    specs: &'static [CommandSpec],
}

impl CommandGraph {
    /// Build the graph, failing on a cyclic or dangling prerequisite
    /// declaration.
    pub fn new() -> Result<Self, GraphError> {
        check_acyclic(SPECS)?;
        Ok(Self { specs: SPECS })
    }

    /// Spec for one command
    pub fn spec(&self, id: CommandId) -> &CommandSpec {
        self.specs
            .iter()
            .find(|spec| spec.id == id)
            .expect("every CommandId has a spec")
    }

    /// Resolve a target into its full prerequisite closure in dependency
    /// order: every prerequisite appears before any command depending on
    /// it, and a command shared by two branches appears once.
    pub fn resolve(&self, target: CommandId) -> Vec<&CommandSpec> {
        let mut ordered = Vec::new();
        let mut seen = Vec::new();
        self.visit(target, &mut seen, &mut ordered);
        ordered
    }

    fn visit<'a>(
        &'a self,
        id: CommandId,
        seen: &mut Vec<CommandId>,
        ordered: &mut Vec<&'a CommandSpec>,
    ) {
        if seen.contains(&id) {
            return;
        }
        seen.push(id);
        let spec = self.spec(id);
        for prereq in spec.prereqs {
            self.visit(*prereq, seen, ordered);
        }
        ordered.push(spec);
    }
}

/// Depth-first cycle check over a spec slice.
fn check_acyclic(specs: &[CommandSpec]) -> Result<(), GraphError> {
    fn visit(
        specs: &[CommandSpec],
        id: CommandId,
        path: &mut Vec<CommandId>,
        done: &mut Vec<CommandId>,
    ) -> Result<(), GraphError> {
        if done.contains(&id) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|p| *p == id) {
            let mut cycle: Vec<String> = path[start..].iter().map(|p| p.name().to_string()).collect();
            cycle.push(id.name().to_string());
            return Err(GraphError::Cycle { cycle });
        }
        let spec = specs.iter().find(|s| s.id == id).ok_or_else(|| {
            GraphError::UnknownPrerequisite {
                command: path.last().map_or("", |p| p.name()).to_string(),
                name: id.name().to_string(),
            }
        })?;
        path.push(id);
        for prereq in spec.prereqs {
            visit(specs, *prereq, path, done)?;
        }
        path.pop();
        done.push(id);
        Ok(())
    }

    let mut done = Vec::new();
    for spec in specs {
        visit(specs, spec.id, &mut Vec::new(), &mut done)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(specs: &[&CommandSpec]) -> Vec<&'static str> {
        specs.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_resolve_full_chain() {
        let graph = CommandGraph::new().unwrap();
        assert_eq!(
            names(&graph.resolve(CommandId::Install)),
            vec!["deps", "generate", "build", "install"]
        );
        assert_eq!(
            names(&graph.resolve(CommandId::Test)),
            vec!["deps", "generate", "build", "test"]
        );
    }

    #[test]
    fn test_resolve_leaf_is_itself() {
        let graph = CommandGraph::new().unwrap();
        assert_eq!(names(&graph.resolve(CommandId::Deps)), vec!["deps"]);
    }

    #[test]
    fn test_every_prereq_precedes_its_dependent() {
        let graph = CommandGraph::new().unwrap();
        for target in [
            CommandId::Deps,
            CommandId::Generate,
            CommandId::Build,
            CommandId::Test,
            CommandId::Install,
        ] {
            let order = graph.resolve(target);
            for (index, spec) in order.iter().enumerate() {
                for prereq in spec.prereqs {
                    let position = order
                        .iter()
                        .position(|s| s.id == *prereq)
                        .expect("prerequisite present in resolution");
                    assert!(position < index, "{} must precede {}", prereq.name(), spec.name());
                }
            }
            // No duplicates.
            let mut ids: Vec<CommandId> = order.iter().map(|s| s.id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), order.len());
        }
    }

    #[test]
    fn test_cycle_is_detected() {
        // A deliberately broken graph: build and generate depend on each
        // other.
        const BROKEN: &[CommandSpec] = &[
            CommandSpec {
                id: CommandId::Generate,
                prereqs: &[CommandId::Build],
                tracked_options: &[],
            },
            CommandSpec {
                id: CommandId::Build,
                prereqs: &[CommandId::Generate],
                tracked_options: &[],
            },
        ];
        let err = check_acyclic(BROKEN).unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }));
        assert!(err.to_string().contains("->"));
    }

    #[test]
    fn test_missing_prereq_is_detected() {
        const DANGLING: &[CommandSpec] = &[CommandSpec {
            id: CommandId::Build,
            prereqs: &[CommandId::Generate],
            tracked_options: &[],
        }];
        let err = check_acyclic(DANGLING).unwrap_err();
        assert!(matches!(err, GraphError::UnknownPrerequisite { .. }));
    }

    #[test]
    fn test_static_graph_is_valid() {
        assert!(CommandGraph::new().is_ok());
    }
}
