//! Service registrations and the container that resolves them
//!
//! A [`ServiceCollection`] is an ordered list of [`ServiceDescriptor`]s. Each
//! descriptor names a capability by the `TypeId` of the requested type, carries
//! a factory and a [`ServiceLifetime`]. Capabilities may be unsized, so trait
//! objects are registered and resolved as `Arc<dyn Trait>`.
//!
//! Building a collection produces a [`ServiceProvider`]. When a capability is
//! registered more than once the last registration wins. Singleton instances
//! are cached per provider, so two providers built from copies of the same
//! collection never share instances created by factories. Pre-built instances
//! registered with [`ServiceCollection::add_instance`] are shared by every
//! provider that carries the registration.

use crate::configuration::Configuration;
use crate::error::{ConfigError, ServiceError, ServiceResult};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type AnyService = Box<dyn Any + Send + Sync>;
type ServiceFactory = Arc<dyn Fn(&ServiceProvider) -> ServiceResult<AnyService> + Send + Sync>;

/// Sharing policy of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// One instance per provider, created on first request
    Singleton,

    /// A new instance for every request
    Transient,
}

/// A single capability registration
#[derive(Clone)]
pub struct ServiceDescriptor {
    service_type: TypeId,
    service_name: &'static str,
    lifetime: ServiceLifetime,
    factory: ServiceFactory,
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service_name)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl ServiceDescriptor {
    /// Describe a singleton built by `factory` on first request
    pub fn singleton<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> ServiceResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::new(ServiceLifetime::Singleton, factory)
    }

    /// Describe a service built by `factory` on every request
    pub fn transient<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> ServiceResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::new(ServiceLifetime::Transient, factory)
    }

    /// Describe a pre-built instance
    pub fn instance<T>(instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::singleton(move |_| Ok(Arc::clone(&instance)))
    }

    fn new<T, F>(lifetime: ServiceLifetime, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> ServiceResult<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            service_type: TypeId::of::<T>(),
            service_name: type_name::<T>(),
            lifetime,
            factory: Arc::new(move |provider| {
                factory(provider).map(|service| Box::new(service) as AnyService)
            }),
        }
    }

    /// Identity of the registered capability
    pub fn service_type(&self) -> TypeId {
        self.service_type
    }

    /// Type name of the registered capability
    pub fn service_name(&self) -> &'static str {
        self.service_name
    }

    /// Sharing policy
    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }
}

/// Ordered collection of service registrations
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registration
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Register a singleton capability
    pub fn add_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> ServiceResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::singleton(factory))
    }

    /// Register a transient capability
    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> ServiceResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::transient(factory))
    }

    /// Register a pre-built instance
    pub fn add_instance<T>(&mut self, instance: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::instance(instance))
    }

    /// Bind `section` of `configuration` to `T` and register the result as an instance
    ///
    /// A missing section binds to `T::default()`.
    pub fn configure<T>(
        &mut self,
        configuration: &Configuration,
        section: &str,
    ) -> Result<&mut Self, ConfigError>
    where
        T: DeserializeOwned + Default + Send + Sync + 'static,
    {
        let options: T = configuration.section(section).bind_or_default()?;
        Ok(self.add_instance(Arc::new(options)))
    }

    /// Check if any registration exists for `T`
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.descriptors.iter().any(|d| d.service_type == id)
    }

    /// Number of registrations, shadowed ones included
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate registrations in order
    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.descriptors.iter()
    }

    /// Build a provider; the last registration for each capability wins
    pub fn build(self) -> ServiceProvider {
        let mut registrations = HashMap::with_capacity(self.descriptors.len());
        for descriptor in self.descriptors {
            registrations.insert(
                descriptor.service_type,
                Registration {
                    descriptor,
                    instance: OnceCell::new(),
                },
            );
        }
        ServiceProvider { registrations }
    }
}

impl Extend<ServiceDescriptor> for ServiceCollection {
    fn extend<I: IntoIterator<Item = ServiceDescriptor>>(&mut self, iter: I) {
        self.descriptors.extend(iter);
    }
}

struct Registration {
    descriptor: ServiceDescriptor,
    instance: OnceCell<AnyService>,
}

/// Resolves services from a built collection
///
/// Dropping the provider drops every singleton it created.
/// Factories must not resolve the capability they construct.
pub struct ServiceProvider {
    registrations: HashMap<TypeId, Registration>,
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

impl ServiceProvider {
    /// Resolve a required capability
    pub fn get_service<T>(&self) -> ServiceResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_optional_service::<T>()?
            .ok_or_else(|| ServiceError::not_registered(type_name::<T>()))
    }

    /// Resolve a capability, `None` when it is not registered
    pub fn get_optional_service<T>(&self) -> ServiceResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let Some(registration) = self.registrations.get(&TypeId::of::<T>()) else {
            return Ok(None);
        };
        let descriptor = &registration.descriptor;

        let service = match descriptor.lifetime {
            ServiceLifetime::Singleton => {
                let instance = registration
                    .instance
                    .get_or_try_init(|| (descriptor.factory)(self))?;
                downcast::<T>(instance, descriptor.service_name)?
            }
            ServiceLifetime::Transient => {
                let instance = (descriptor.factory)(self)?;
                downcast::<T>(&instance, descriptor.service_name)?
            }
        };

        Ok(Some(service))
    }

    /// Check if a capability is registered
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.registrations.contains_key(&TypeId::of::<T>())
    }

    /// Number of resolvable capabilities
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

fn downcast<T: ?Sized + 'static>(service: &AnyService, name: &str) -> ServiceResult<Arc<T>> {
    (**service)
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| ServiceError::type_mismatch(name))
}
