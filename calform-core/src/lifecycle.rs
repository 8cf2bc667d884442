//! Lifecycle - Apply provider operations to locally held state
//!
//! The host keeps one `State` per resource. These helpers commit the result
//! of a provider call to that state only when the call succeeds, so a failed
//! operation never leaves a partially updated state behind.

use crate::provider::{Provider, ProviderError, ProviderResult};
use crate::resource::{Resource, State};

/// Create a resource and return its first state
pub async fn create<P>(provider: &P, resource: &Resource) -> ProviderResult<State>
where
    P: Provider + ?Sized,
{
    let state = provider.create(resource).await?;
    if state.identifier.is_none() {
        return Err(
            ProviderError::new("Provider returned no identifier for the created resource")
                .for_resource(resource.id.clone()),
        );
    }
    Ok(state)
}

/// Refresh `state` from the remote service
pub async fn refresh<P>(provider: &P, state: &mut State) -> ProviderResult<()>
where
    P: Provider + ?Sized,
{
    let refreshed = provider.read(state).await?;
    *state = refreshed;
    Ok(())
}

/// Update the resource behind `state` to match `to`
pub async fn update<P>(provider: &P, state: &mut State, to: &Resource) -> ProviderResult<()>
where
    P: Provider + ?Sized,
{
    let updated = provider.update(state, to).await?;
    if updated.identifier != state.identifier {
        return Err(ProviderError::new(format!(
            "Provider changed the identifier from {:?} to {:?} during update",
            state.identifier, updated.identifier
        ))
        .for_resource(state.id.clone()));
    }
    *state = updated;
    Ok(())
}

/// Delete the resource behind `state`, clearing local identity on success
pub async fn destroy<P>(provider: &P, state: &mut State) -> ProviderResult<()>
where
    P: Provider + ?Sized,
{
    provider.delete(state).await?;
    *state = State::not_found(state.id.clone());
    Ok(())
}
