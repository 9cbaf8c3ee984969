use alloc::{
    string::{String, ToString as _},
    vec::Vec,
};
use core::fmt::{self, Display, Formatter};
use tracing::{error, info_span};

use crate::{
    any::TypeInfo,
    container::Container,
    errors::ResolveErrorKind,
    lifestyle::Lifestyle,
    registration::RegistrationId,
};

/// Registration in a resolved dependency tree together with the lifestyle it was resolved to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyNode {
    pub id: RegistrationId,
    pub service: TypeInfo,
    pub implementation: TypeInfo,
    pub lifestyle: Lifestyle,
    /// Dependencies in constructor parameter order
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Human-readable rendering of a dependency tree.
///
/// Every node is written as a constructor call with its dependencies as arguments,
/// each line ends with the lifestyle of the node that starts on it:
///
/// ```text
/// Consumer( // Scoped
///     Repository(), // Scoped
///     Clock()) // Singleton
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectGraph {
    pub root: DependencyNode,
}

struct Line {
    text: String,
    lifestyle: &'static str,
}

impl ObjectGraph {
    fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        render(&self.root, 0, &mut lines);
        lines
    }
}

fn render(node: &DependencyNode, depth: usize, lines: &mut Vec<Line>) {
    let mut text = "    ".repeat(depth);
    text.push_str(&node.implementation.short_name());
    text.push('(');
    if node.is_leaf() {
        text.push(')');
    }
    lines.push(Line {
        text,
        lifestyle: node.lifestyle.name,
    });

    let last = node.children.len().saturating_sub(1);
    for (index, child) in node.children.iter().enumerate() {
        render(child, depth + 1, lines);
        if let Some(line) = lines.last_mut() {
            line.text.push(if index == last { ')' } else { ',' });
        }
    }
}

impl Display for ObjectGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, Line { text, lifestyle }) in self.lines().iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{text} // {lifestyle}")?;
        }
        Ok(())
    }
}

impl Container {
    /// Builds the dependency tree of a registration with every node's resolved lifestyle.
    /// Shared dependencies appear once per consumer.
    ///
    /// # Errors
    /// - Returns errors of [`Container::relationships`] and [`Container::resolve_lifestyle`] for any node
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if the tree would be infinite
    /// - Returns [`ResolveErrorKind::UnknownRegistration`] if the id was issued by another container
    pub fn dependency_tree(&self, id: RegistrationId) -> Result<DependencyNode, ResolveErrorKind> {
        let span = info_span!("dependency_tree", service = self.checked_node(id)?.service.name);
        let _guard = span.enter();

        self.dependency_node(id, &mut Vec::new())
    }

    fn dependency_node(&self, id: RegistrationId, path: &mut Vec<RegistrationId>) -> Result<DependencyNode, ResolveErrorKind> {
        if let Some(position) = path.iter().position(|visited| *visited == id) {
            let mut cycle: Vec<_> = path[position..].iter().map(|id| self.node(*id).service).collect();
            cycle.push(self.node(id).service);

            let err = ResolveErrorKind::CyclicDependency { path: cycle.into() };
            error!("{}", err);
            return Err(err);
        }

        let registration = self.node(id);
        let relationships = self.relationships(id)?;

        path.push(id);
        let mut children = Vec::with_capacity(relationships.len());
        for relationship in relationships.iter() {
            children.push(self.dependency_node(relationship.dependency, path)?);
        }
        path.pop();

        Ok(DependencyNode {
            id,
            service: registration.service,
            implementation: registration.implementation,
            lifestyle: self.resolve_lifestyle(id)?,
            children,
        })
    }

    /// Renders the dependency tree of the registration of service `S`
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NotRegistered`] if `S` isn't registered
    /// - Returns errors of [`Container::dependency_tree`]
    pub fn object_graph<S: ?Sized + 'static>(&self) -> Result<ObjectGraph, ResolveErrorKind> {
        let registration = self.registration_or_err(&TypeInfo::of::<S>())?;
        Ok(ObjectGraph {
            root: self.dependency_tree(registration.id)?,
        })
    }

    /// Same as [`Container::object_graph`], rendered to a string
    ///
    /// # Errors
    /// Returns errors of [`Container::object_graph`]
    pub fn visualize_object_graph<S: ?Sized + 'static>(&self) -> Result<String, ResolveErrorKind> {
        self.object_graph::<S>().map(|graph| graph.to_string())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use crate::{
        config::Config,
        descriptor::{Component, ComponentDescriptor, ConstructorDescriptor},
        errors::ResolveErrorKind,
        lifestyle::{DeclaredLifestyle, Lifestyle},
        registry::RegistryBuilder,
        Container,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
    };
    use core::marker::PhantomData;
    use tracing_test::traced_test;

    const ASYNC_SCOPED: Lifestyle = Lifestyle::new("Async Scoped", 500);

    trait Service {}

    struct NoDependencies1;
    struct NoDependencies2;
    struct DependingOn<T: ?Sized>(PhantomData<T>);
    struct DependingOn2<T1, T2>(PhantomData<(T1, T2)>);
    struct ServiceDecoratorDependingOn<T>(PhantomData<T>);
    struct Loop;

    impl Component for NoDependencies1 {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new())
        }
    }

    impl Component for NoDependencies2 {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new())
        }
    }

    impl<T: ?Sized + 'static> Component for DependingOn<T> {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<T>())
        }
    }

    impl<T1: 'static, T2: 'static> Component for DependingOn2<T1, T2> {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<T1>().param::<T2>())
        }
    }

    impl<T: 'static> Component for ServiceDecoratorDependingOn<T> {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<dyn Service>().param::<T>())
        }
    }

    impl Component for Loop {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<Loop>())
        }
    }

    fn automatic_builder() -> RegistryBuilder {
        RegistryBuilder::new_with_config(Config {
            default_lifestyle: DeclaredLifestyle::Automatic,
            ..Config::default()
        })
    }

    #[test]
    #[traced_test]
    fn test_decorator_with_only_singleton_dependencies() {
        let container = Container::new(
            automatic_builder()
                .register_default::<NoDependencies1, NoDependencies1>()
                .register_default::<NoDependencies2, NoDependencies2>()
                .register_default::<dyn Service, DependingOn2<NoDependencies1, NoDependencies2>>()
                .decorate::<dyn Service, ServiceDecoratorDependingOn<NoDependencies1>>()
                .register_default::<DependingOn<dyn Service>, DependingOn<dyn Service>>(),
        )
        .unwrap();
        container.verify().unwrap();

        assert_eq!(
            container.visualize_object_graph::<DependingOn<dyn Service>>().unwrap(),
            "\
DependingOn<dyn Service>( // Singleton
    ServiceDecoratorDependingOn<NoDependencies1>( // Singleton
        DependingOn2<NoDependencies1, NoDependencies2>( // Singleton
            NoDependencies1(), // Singleton
            NoDependencies2()), // Singleton
        NoDependencies1())) // Singleton"
        );
    }

    #[test]
    #[traced_test]
    fn test_decorator_with_decoratee_with_one_scoped_dependency() {
        let container = Container::new(
            automatic_builder()
                .register_default::<DependingOn<dyn Service>, DependingOn<dyn Service>>()
                .decorate::<dyn Service, ServiceDecoratorDependingOn<NoDependencies1>>()
                .register_default::<dyn Service, DependingOn2<NoDependencies1, NoDependencies2>>()
                .register::<NoDependencies2, NoDependencies2>(ASYNC_SCOPED)
                .register_default::<NoDependencies1, NoDependencies1>(),
        )
        .unwrap();
        container.verify().unwrap();

        assert_eq!(
            container.visualize_object_graph::<DependingOn<dyn Service>>().unwrap(),
            "\
DependingOn<dyn Service>( // Async Scoped
    ServiceDecoratorDependingOn<NoDependencies1>( // Async Scoped
        DependingOn2<NoDependencies1, NoDependencies2>( // Async Scoped
            NoDependencies1(), // Singleton
            NoDependencies2()), // Async Scoped
        NoDependencies1())) // Singleton"
        );
    }

    #[test]
    #[traced_test]
    fn test_decorator_with_singleton_decoratee_and_transient_dependency() {
        let container = Container::new(
            automatic_builder()
                .register_default::<DependingOn<dyn Service>, DependingOn<dyn Service>>()
                .register_default::<dyn Service, DependingOn2<NoDependencies1, NoDependencies1>>()
                .decorate::<dyn Service, ServiceDecoratorDependingOn<NoDependencies2>>()
                .register_default::<NoDependencies1, NoDependencies1>()
                .register::<NoDependencies2, NoDependencies2>(Lifestyle::TRANSIENT),
        )
        .unwrap();
        container.verify().unwrap();

        let graph = container.object_graph::<DependingOn<dyn Service>>().unwrap();

        assert_eq!(graph.root.lifestyle, Lifestyle::TRANSIENT);
        assert_eq!(graph.root.children[0].children[0].lifestyle, Lifestyle::SINGLETON);
        assert_eq!(
            graph.to_string(),
            "\
DependingOn<dyn Service>( // Transient
    ServiceDecoratorDependingOn<NoDependencies2>( // Transient
        DependingOn2<NoDependencies1, NoDependencies1>( // Singleton
            NoDependencies1(), // Singleton
            NoDependencies1()), // Singleton
        NoDependencies2())) // Transient"
        );
    }

    #[test]
    #[traced_test]
    fn test_single_node() {
        let container = Container::new(automatic_builder().register_default::<NoDependencies1, NoDependencies1>()).unwrap();

        let graph = container.object_graph::<NoDependencies1>().unwrap();

        assert!(graph.root.is_leaf());
        assert_eq!(graph.to_string(), "NoDependencies1() // Singleton");
    }

    #[test]
    #[traced_test]
    fn test_cyclic_tree() {
        let container = Container::new(Container::builder().register::<Loop, Loop>(Lifestyle::TRANSIENT)).unwrap();

        assert!(matches!(
            container.object_graph::<Loop>(),
            Err(ResolveErrorKind::CyclicDependency { path }) if path.len() == 2
        ));
    }
}
