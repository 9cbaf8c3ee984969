use alloc::{collections::BTreeSet, sync::Arc, vec::Vec};
use core::{iter, mem};
use tracing::{debug, error, info_span};

use crate::{
    any::TypeInfo,
    container::Container,
    errors::ResolveErrorKind,
    lifestyle::Lifestyle,
    registration::{RegistrationId, Relationship},
};

/// Registration in `Resolving` state: its dependencies are being walked
struct Frame {
    id: RegistrationId,
    relationships: Arc<[Relationship]>,
    next: usize,
    shortest: Option<Lifestyle>,
    ambiguous: Option<Lifestyle>,
}

impl Frame {
    #[inline]
    fn new(id: RegistrationId, relationships: Arc<[Relationship]>) -> Self {
        Self {
            id,
            relationships,
            next: 0,
            shortest: None,
            ambiguous: None,
        }
    }

    fn take_next(&mut self) -> Option<Relationship> {
        let relationship = self.relationships.get(self.next).copied();
        if relationship.is_some() {
            self.next += 1;
        }
        relationship
    }

    fn push_dependency_lifestyle(&mut self, lifestyle: Lifestyle) {
        match self.shortest {
            None => self.shortest = Some(lifestyle),
            Some(shortest) if lifestyle.is_shorter_than(&shortest) => {
                self.shortest = Some(lifestyle);
                self.ambiguous = None;
            }
            Some(shortest) if lifestyle.length == shortest.length && lifestyle != shortest => {
                self.ambiguous.get_or_insert(lifestyle);
            }
            Some(_) => {}
        }
    }

    /// A leaf can't capture anything shorter-lived, so it's built once per process
    fn finish(&self, service: TypeInfo) -> Result<Lifestyle, ResolveErrorKind> {
        match (self.shortest, self.ambiguous) {
            (None, _) => Ok(Lifestyle::SINGLETON),
            (Some(shortest), None) => Ok(shortest),
            (Some(first), Some(second)) => Err(ResolveErrorKind::AmbiguousLifestyle { service, first, second }),
        }
    }
}

impl Container {
    /// Returns the concrete lifestyle of a registration.
    ///
    /// Declared lifestyles are returned as is. An automatic lifestyle resolves to the shortest lifestyle
    /// among the direct dependencies (resolving automatic dependencies first), or to [`Lifestyle::SINGLETON`]
    /// if there are no dependencies, so a component never outlives something it holds.
    /// The result is cached, repeated calls return the same value.
    /// Only cycles through automatic registrations are found here, [`Container::resolved_graph`] and
    /// [`Container::verify`] check the whole graph.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if an automatic registration is reached while it's still being resolved
    /// - Returns [`ResolveErrorKind::AmbiguousLifestyle`] if distinct lifestyles share the shortest length
    /// - Returns errors of [`Container::relationships`] for any registration in the walked graph
    pub fn resolve_lifestyle(&self, id: RegistrationId) -> Result<Lifestyle, ResolveErrorKind> {
        let registration = self.checked_node(id)?;
        if let Some(lifestyle) = registration.lifestyle() {
            return Ok(lifestyle);
        }

        let span = info_span!("resolve_lifestyle", service = registration.service.name);
        let _guard = span.enter();

        let _resolution = self.resolution.lock();
        if let Some(lifestyle) = registration.resolved_lifestyle.get() {
            debug!(lifestyle = lifestyle.name, "Resolved by another caller");
            return Ok(lifestyle);
        }

        let mut resolving = BTreeSet::from([id]);
        let mut current = Frame::new(id, self.relationships(id)?);
        let mut parents: Vec<Frame> = Vec::new();

        loop {
            if let Some(Relationship { dependency, .. }) = current.take_next() {
                let dependency = self.node(dependency);
                if let Some(lifestyle) = dependency.lifestyle() {
                    current.push_dependency_lifestyle(lifestyle);
                    continue;
                }
                if resolving.contains(&dependency.id) {
                    let err = self.cycle_error(&parents, &current, dependency.id);
                    error!("{}", err);
                    return Err(err);
                }

                let relationships = self.relationships(dependency.id)?;
                resolving.insert(dependency.id);
                parents.push(mem::replace(&mut current, Frame::new(dependency.id, relationships)));
                continue;
            }

            let registration = self.node(current.id);
            let lifestyle = match current.finish(registration.service) {
                Ok(lifestyle) => lifestyle,
                Err(err) => {
                    error!("{}", err);
                    return Err(err);
                }
            };
            let lifestyle = registration.resolved_lifestyle.get_or_set(lifestyle);
            debug!(service = registration.service.name, lifestyle = lifestyle.name, "Lifestyle resolved");

            resolving.remove(&current.id);
            match parents.pop() {
                Some(parent) => {
                    current = parent;
                    current.push_dependency_lifestyle(lifestyle);
                }
                None => return Ok(lifestyle),
            }
        }
    }

    /// Resolves the lifestyle of the registration of service `S`
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NotRegistered`] if `S` isn't registered
    /// - Returns errors of [`Container::resolve_lifestyle`]
    pub fn lifestyle_of<S: ?Sized + 'static>(&self) -> Result<Lifestyle, ResolveErrorKind> {
        let registration = self.registration_or_err(&TypeInfo::of::<S>())?;
        self.resolve_lifestyle(registration.id)
    }

    fn cycle_error(&self, parents: &[Frame], current: &Frame, revisited: RegistrationId) -> ResolveErrorKind {
        let mut path: Vec<TypeInfo> = parents
            .iter()
            .chain(iter::once(current))
            .skip_while(|frame| frame.id != revisited)
            .map(|frame| self.node(frame.id).service)
            .collect();
        path.push(self.node(revisited).service);

        ResolveErrorKind::CyclicDependency { path: path.into() }
    }
}
