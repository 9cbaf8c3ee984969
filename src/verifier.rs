use alloc::{boxed::Box, collections::BTreeSet, sync::Arc, vec::Vec};
use tracing::{debug, error, info_span, warn};

use crate::{
    any::TypeInfo,
    container::Container,
    errors::{ResolveErrorKind, VerificationError, VerificationFailure},
    registration::RegistrationId,
    strategy::ResolvedGraph,
};

impl Container {
    /// Checks the whole graph before it's used.
    ///
    /// Structural cycles are detected first, then every registration that isn't part of a cycle goes through
    /// constructor selection, relationship discovery, lifestyle resolution and strategy compilation.
    /// A registration stops at its first error, the rest of registrations are still verified.
    /// Registrations that only fail because they depend on a reported cycle aren't reported again.
    ///
    /// # Errors
    /// Returns [`VerificationError`] with every failure found
    pub fn verify(&self) -> Result<(), VerificationError> {
        let span = info_span!("verify", registrations = self.len());
        let _guard = span.enter();

        let mut failures = Vec::new();
        let mut on_cycle = BTreeSet::new();
        let mut cycle_services = BTreeSet::new();

        for cycle in self.dfs_detect() {
            on_cycle.extend(cycle.iter().copied());
            let path = self.cycle_path(&cycle);
            cycle_services.extend(path.iter().copied());
            failures.push(VerificationFailure {
                service: path[0],
                error: ResolveErrorKind::CyclicDependency { path },
            });
        }

        for registration in self.registrations() {
            if on_cycle.contains(&registration.id) {
                continue;
            }
            // No cycles found, nothing to check per registration
            let result = if on_cycle.is_empty() {
                self.verify_registration(registration.id)
            } else {
                self.resolved_graph(registration.id).map(|_| ())
            };

            match result {
                Ok(()) => {}
                Err(ResolveErrorKind::CyclicDependency { path }) if path.iter().all(|service| cycle_services.contains(service)) => {
                    debug!(service = registration.service.name, "Depends on a reported cycle");
                }
                Err(error) => failures.push(VerificationFailure {
                    service: registration.service,
                    error,
                }),
            }
        }

        if failures.is_empty() {
            debug!("Verified");
            return Ok(());
        }

        let err = VerificationError { failures };
        error!("{}", err);
        Err(err)
    }

    fn verify_registration(&self, id: RegistrationId) -> Result<(), ResolveErrorKind> {
        self.select_constructor(id)?;
        self.relationships(id)?;
        self.resolve_lifestyle(id)?;
        self.compile_graph(id)?;
        Ok(())
    }

    /// Resolves the lifestyle of the registration and compiles its creation strategy.
    /// The graph is built once, later calls return the same [`Arc`].
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if a cycle is reachable from the registration,
    ///   whatever the lifestyles on it
    /// - Returns errors of [`Container::resolve_lifestyle`] and [`Container::relationships`]
    /// - Returns [`ResolveErrorKind::Compile`] if the strategy compiler fails
    pub fn resolved_graph(&self, id: RegistrationId) -> Result<Arc<ResolvedGraph>, ResolveErrorKind> {
        let registration = self.checked_node(id)?;
        if let Some(graph) = registration.resolved_graph.get() {
            return Ok(graph);
        }

        let mut cycles = Vec::new();
        self.dfs_visit(id, &mut BTreeSet::new(), &mut Vec::new(), &mut cycles);
        if let Some(cycle) = cycles.first() {
            let err = ResolveErrorKind::CyclicDependency {
                path: self.cycle_path(cycle),
            };
            error!("{}", err);
            return Err(err);
        }

        self.compile_graph(id)
    }

    fn compile_graph(&self, id: RegistrationId) -> Result<Arc<ResolvedGraph>, ResolveErrorKind> {
        let registration = self.node(id);
        if let Some(graph) = registration.resolved_graph.get() {
            return Ok(graph);
        }

        let lifestyle = self.resolve_lifestyle(id)?;
        let relationships = self.relationships(id)?;

        let span = info_span!("resolved_graph", service = registration.service.name, lifestyle = lifestyle.name);
        let _guard = span.enter();

        let strategy = self.compiler.compile(registration, lifestyle, &relationships).map_err(|error| {
            let err = ResolveErrorKind::Compile {
                service: registration.service,
                error,
            };
            error!("{}", err);
            err
        })?;

        debug!(caching = ?strategy.caching, "Strategy compiled");
        Ok(registration.resolved_graph.get_or_set(Arc::new(ResolvedGraph { lifestyle, strategy })))
    }

    fn cycle_path(&self, cycle: &[RegistrationId]) -> Box<[TypeInfo]> {
        cycle.iter().map(|id| self.node(*id).service).collect()
    }

    /// Returns every structural cycle as a path that starts and ends with the same registration.
    /// Registrations whose relationships can't be discovered are treated as leaves.
    pub(crate) fn dfs_detect(&self) -> Vec<Box<[RegistrationId]>> {
        let mut visited = BTreeSet::new();
        let mut stack = Vec::new();
        let mut cycles = Vec::new();

        for registration in self.registrations() {
            self.dfs_visit(registration.id, &mut visited, &mut stack, &mut cycles);
        }
        cycles
    }

    fn dfs_visit(
        &self,
        id: RegistrationId,
        visited: &mut BTreeSet<RegistrationId>,
        stack: &mut Vec<RegistrationId>,
        cycles: &mut Vec<Box<[RegistrationId]>>,
    ) {
        if visited.contains(&id) {
            return;
        }
        if let Some(position) = stack.iter().position(|in_stack| *in_stack == id) {
            let mut cycle = stack[position..].to_vec();
            cycle.push(id);
            warn!(len = cycle.len() - 1, "Cycle found");
            cycles.push(cycle.into_boxed_slice());
            return;
        }
        stack.push(id);

        if let Ok(relationships) = self.relationships(id) {
            for relationship in relationships.iter() {
                self.dfs_visit(relationship.dependency, visited, stack, cycles);
            }
        }

        stack.pop();
        visited.insert(id);
    }
}
