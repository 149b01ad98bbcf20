//! Dependency resolution.
//!
//! Resolution walks requirements breadth-first from the root recipe,
//! pinning one version per package name. Every requirement seen for a
//! name is accumulated, and the pin must satisfy all of them at once;
//! when a later requirement invalidates an earlier pin the walk restarts
//! with the tighter constraint set, minus whatever the evicted version
//! itself had asked for. The evicting requirement always survives the
//! restart, so pinned versions only ever move down and the process
//! terminates.
//!
//! Test requirements resolve in a second pass with every regular pin
//! frozen. A test requirement that cannot live with a frozen pin is a
//! conflict, never a fork.

pub mod errors;
pub mod graph;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use semver::VersionReq;

use crate::core::{ConfigSnapshot, RecipeSummary, Requirement, Settings};
use crate::registry::Registry;

pub use errors::ResolveError;
pub use graph::{PackageGraph, PackageNode};

/// Requirements recorded against a package name, keyed by name.
/// Each entry remembers who asked and for what range.
type ConstraintMap = BTreeMap<String, Vec<(String, VersionReq)>>;

/// Result of resolution: the regular graph (root included) and the
/// graph of packages pulled in only by the root's test requirements.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub graph: PackageGraph,
    pub test_graph: PackageGraph,
}

/// One converged expansion pass: pins plus the requirement edges seen.
struct Expansion {
    pins: BTreeMap<String, RecipeSummary>,
    edges: BTreeSet<(String, String)>,
}

/// Resolves requirement sets against a registry.
pub struct Resolver<'a> {
    registry: &'a dyn Registry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a dyn Registry) -> Self {
        Resolver { registry }
    }

    /// Resolve the root recipe into a package graph.
    ///
    /// `root_snapshot` is the root's already-evaluated configuration;
    /// `base_settings` is the full setting state used to evaluate each
    /// dependency's own snapshot.
    pub fn resolve(
        &self,
        root: RecipeSummary,
        root_snapshot: ConfigSnapshot,
        base_settings: &Settings,
    ) -> Result<Resolution, ResolveError> {
        let root_id = root.package_id().clone();
        let root_name = root.name().to_string();

        let mut frozen = BTreeMap::new();
        frozen.insert(root_name.clone(), root.clone());

        let seeds: Vec<(String, Requirement)> = root
            .recipe()
            .regular_requirements()
            .map(|r| (root_id.to_string(), r.clone()))
            .collect();

        let mut constraints = ConstraintMap::new();
        let regular = self.expand(&frozen, &seeds, &root_name, &mut constraints)?;

        tracing::debug!(
            "resolved {} package(s) for {}",
            regular.pins.len(),
            root_id
        );

        let mut graph = PackageGraph::new();
        for (name, summary) in &regular.pins {
            let snapshot = if name == &root_name {
                root_snapshot.clone()
            } else {
                ConfigSnapshot::for_recipe(base_settings, summary.recipe())?
            };
            graph.add_package(summary.clone(), snapshot);
        }
        graph.set_root(root_id.clone());
        for (from, to) in &regular.edges {
            let pair = (graph.package_by_name(from), graph.package_by_name(to));
            if let (Some(from_id), Some(to_id)) = pair {
                let (from_id, to_id) = (from_id.clone(), to_id.clone());
                graph.add_edge(&from_id, &to_id);
            }
        }

        if let Some(cycle) = graph.find_cycle() {
            return Err(ResolveError::CycleDetected { packages: cycle });
        }

        let test_seeds: Vec<(String, Requirement)> = root
            .recipe()
            .test_requirements()
            .map(|r| (format!("{} (test)", root_id), r.clone()))
            .collect();

        let mut test_graph = PackageGraph::new();
        if !test_seeds.is_empty() {
            let mut test_constraints = ConstraintMap::new();
            let test = self.expand(&regular.pins, &test_seeds, &root_name, &mut test_constraints)?;

            for (name, summary) in &test.pins {
                if regular.pins.contains_key(name) {
                    continue;
                }
                let snapshot = ConfigSnapshot::for_recipe(base_settings, summary.recipe())?;
                test_graph.add_package(summary.clone(), snapshot);
            }
            for (from, to) in &test.edges {
                if regular.pins.contains_key(from) || regular.pins.contains_key(to) {
                    continue;
                }
                let pair = (test_graph.package_by_name(from), test_graph.package_by_name(to));
                if let (Some(from_id), Some(to_id)) = pair {
                    let (from_id, to_id) = (from_id.clone(), to_id.clone());
                    test_graph.add_edge(&from_id, &to_id);
                }
            }

            if let Some(cycle) = test_graph.find_cycle() {
                return Err(ResolveError::CycleDetected { packages: cycle });
            }

            tracing::debug!(
                "resolved {} test-only package(s) for {}",
                test_graph.len(),
                root_id
            );
        }

        Ok(Resolution { graph, test_graph })
    }

    /// Run expansion passes until one converges without narrowing.
    ///
    /// `frozen` pins can never be replaced; a requirement they fail is a
    /// conflict. `seeds` are processed before the queue-driven walk, which
    /// then follows the regular requirements of every pinned package.
    fn expand(
        &self,
        frozen: &BTreeMap<String, RecipeSummary>,
        seeds: &[(String, Requirement)],
        seed_origin: &str,
        constraints: &mut ConstraintMap,
    ) -> Result<Expansion, ResolveError> {
        'attempt: loop {
            let mut pins = frozen.clone();
            let mut edges = BTreeSet::new();
            let mut queue: VecDeque<String> = VecDeque::new();
            let mut expanded: BTreeSet<String> = BTreeSet::new();

            for (requirer, req) in seeds {
                if self.apply_requirement(
                    seed_origin,
                    requirer,
                    req,
                    frozen,
                    &mut pins,
                    &mut edges,
                    &mut queue,
                    constraints,
                )? {
                    continue 'attempt;
                }
            }

            while let Some(name) = queue.pop_front() {
                if !expanded.insert(name.clone()) {
                    continue;
                }
                let Some(summary) = pins.get(&name).cloned() else {
                    continue;
                };
                let requirer = summary.package_id().to_string();
                for req in summary.recipe().regular_requirements() {
                    if self.apply_requirement(
                        &name,
                        &requirer,
                        req,
                        frozen,
                        &mut pins,
                        &mut edges,
                        &mut queue,
                        constraints,
                    )? {
                        continue 'attempt;
                    }
                }
            }

            return Ok(Expansion { pins, edges });
        }
    }

    /// Record one requirement and reconcile it with the current pins.
    ///
    /// Returns `Ok(true)` when an existing pin had to be dropped and the
    /// caller must restart the expansion pass. The dropped version's own
    /// recorded requirements are discarded along with it.
    #[allow(clippy::too_many_arguments)]
    fn apply_requirement(
        &self,
        origin: &str,
        requirer: &str,
        req: &Requirement,
        frozen: &BTreeMap<String, RecipeSummary>,
        pins: &mut BTreeMap<String, RecipeSummary>,
        edges: &mut BTreeSet<(String, String)>,
        queue: &mut VecDeque<String>,
        constraints: &mut ConstraintMap,
    ) -> Result<bool, ResolveError> {
        let dep = req.name();
        edges.insert((origin.to_string(), dep.to_string()));
        add_constraint(constraints, dep, requirer, req.version_req());

        match pins.get(dep) {
            Some(pinned) if req.matches_version(pinned.version()) => {
                queue.push_back(dep.to_string());
                Ok(false)
            }
            Some(pinned) => {
                if frozen.contains_key(dep) {
                    // The pin cannot move; report it alongside the
                    // requirements that disagree with it.
                    let mut requirements = vec![(
                        pinned.package_id().to_string(),
                        format!("={}", pinned.version()),
                    )];
                    if let Some(recorded) = constraints.get(dep) {
                        requirements
                            .extend(recorded.iter().map(|(who, r)| (who.clone(), r.to_string())));
                    }
                    return Err(ResolveError::VersionConflict {
                        package: dep.to_string(),
                        requirements,
                    });
                }

                // The evicted version leaves the graph, and whatever it
                // asked for leaves with it; the replacement records its
                // own requirements on the next pass. Re-adding the
                // evicting requirement keeps a version whose requirement
                // rules itself out converging on a conflict.
                let evicted = pinned.package_id().to_string();
                for recorded in constraints.values_mut() {
                    recorded.retain(|(who, _)| who != &evicted);
                }
                add_constraint(constraints, dep, requirer, req.version_req());

                tracing::debug!(
                    "requirement {} {} invalidates pinned {}; restarting expansion",
                    dep,
                    req.version_req(),
                    evicted
                );
                Ok(true)
            }
            None => {
                let selected = self.select(dep, constraints)?;
                tracing::debug!("pinned {}", selected.package_id());
                pins.insert(dep.to_string(), selected);
                queue.push_back(dep.to_string());
                Ok(false)
            }
        }
    }

    /// Pick the highest version of `name` satisfying every recorded
    /// requirement against it.
    fn select(
        &self,
        name: &str,
        constraints: &ConstraintMap,
    ) -> Result<RecipeSummary, ResolveError> {
        let Some(reqs) = constraints.get(name).filter(|r| !r.is_empty()) else {
            return Err(ResolveError::Unavailable {
                package: name.to_string(),
                requirer: String::new(),
                requirement: "*".to_string(),
                available: Vec::new(),
                source: None,
            });
        };
        let (first_requirer, first_req) = &reqs[0];

        // Anything satisfying every requirement also satisfies the first,
        // so query with that and filter the (descending) candidates.
        let candidates = self.registry.query(name, first_req).map_err(|err| {
            ResolveError::Unavailable {
                package: name.to_string(),
                requirer: first_requirer.clone(),
                requirement: first_req.to_string(),
                available: Vec::new(),
                source: Some(err),
            }
        })?;

        let chosen = candidates
            .into_iter()
            .find(|summary| reqs.iter().all(|(_, r)| r.matches(summary.version())));

        match chosen {
            Some(summary) => Ok(summary),
            None if reqs.len() == 1 => {
                let available = self
                    .registry
                    .all_versions(name)
                    .unwrap_or_default()
                    .iter()
                    .map(|v| v.to_string())
                    .collect();
                Err(ResolveError::Unavailable {
                    package: name.to_string(),
                    requirer: first_requirer.clone(),
                    requirement: first_req.to_string(),
                    available,
                    source: None,
                })
            }
            None => Err(ResolveError::VersionConflict {
                package: name.to_string(),
                requirements: reqs
                    .iter()
                    .map(|(who, r)| (who.clone(), r.to_string()))
                    .collect(),
            }),
        }
    }
}

/// Record a requirement against a name, skipping exact duplicates.
fn add_constraint(constraints: &mut ConstraintMap, name: &str, requirer: &str, req: &VersionReq) {
    let entry = constraints.entry(name.to_string()).or_default();
    if !entry.iter().any(|(who, r)| who == requirer && r == req) {
        entry.push((requirer.to_string(), req.clone()));
    }
}
