//! RouteAuthorizer composition tests
//!
//! The authorizer runs the base guard on every protected route and the
//! role guard demanded by the route table, mirroring the application's
//! nested route guards.

use std::sync::Arc;

use cg_common::routes;
use cg_guard::mock::{FailingResolver, MemoryNavigator, StaticResolver};
use cg_guard::{Decision, NavigationCommand, NavigationEpoch, RouteAuthorizer, RouteTable};
use cg_session::{session_channel, SessionHandle};

fn authorizer(
    resolver: Arc<StaticResolver>,
    authenticated: bool,
) -> (Arc<MemoryNavigator>, RouteAuthorizer) {
    let (controller, session): (_, SessionHandle) = session_channel();
    if authenticated {
        controller.complete_login();
    } else {
        controller.clear();
    }

    let navigator = Arc::new(MemoryNavigator::new(routes::HOME));
    let table = RouteTable::clinic_defaults(NavigationEpoch::new());
    let auth = RouteAuthorizer::new(table, session, resolver, navigator.clone());
    (navigator, auth)
}

#[tokio::test]
async fn test_public_route_allowed_without_session() {
    let resolver = Arc::new(StaticResolver::medico());
    let (navigator, authorizer) = authorizer(resolver.clone(), false);

    assert!(authorizer.authorize(routes::HOME).await.is_allow());
    assert!(authorizer.authorize(routes::LOGIN).await.is_allow());
    assert!(navigator.commands().is_empty());
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_unregistered_route_treated_as_public() {
    let (navigator, authorizer) = authorizer(Arc::new(StaticResolver::medico()), false);

    assert!(authorizer.authorize("/acerca-de").await.is_allow());
    assert!(navigator.commands().is_empty());
}

#[tokio::test]
async fn test_authenticated_route_allows_any_role() {
    let (_navigator, authorizer) = authorizer(Arc::new(StaticResolver::no_profile()), true);

    assert!(authorizer.authorize(routes::ONBOARDING).await.is_allow());
}

#[tokio::test]
async fn test_protected_route_anonymous_redirects_login() {
    let resolver = Arc::new(StaticResolver::medico());
    let (navigator, authorizer) = authorizer(resolver.clone(), false);

    let decision = authorizer.authorize(routes::DASHBOARD_MEDICO).await;

    assert_eq!(decision, Decision::redirect(routes::LOGIN));
    assert_eq!(navigator.last(), Some(NavigationCommand::replace(routes::LOGIN)));
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_medico_passes_full_chain() {
    let resolver = Arc::new(StaticResolver::medico());
    let (navigator, authorizer) = authorizer(resolver.clone(), true);

    let decision = authorizer.authorize(routes::DASHBOARD_MEDICO).await;

    assert!(decision.is_allow());
    assert!(navigator.commands().is_empty());
    // A fresh fetch per guard in the chain: base guard, then role guard.
    assert_eq!(resolver.calls(), 2);
}

#[tokio::test]
async fn test_paciente_on_medico_route_sent_home() {
    let (navigator, authorizer) = authorizer(Arc::new(StaticResolver::paciente()), true);

    let decision = authorizer.authorize(routes::DASHBOARD_MEDICO).await;

    assert_eq!(decision, Decision::redirect(routes::HOME));
    assert_eq!(navigator.last(), Some(NavigationCommand::replace(routes::HOME)));
}

#[tokio::test]
async fn test_medico_on_paciente_route_sent_to_dashboard() {
    let (navigator, authorizer) = authorizer(Arc::new(StaticResolver::medico()), true);

    let decision = authorizer.authorize("/mis-citas").await;

    assert_eq!(decision, Decision::redirect(routes::DASHBOARD_MEDICO));
    assert_eq!(
        navigator.last(),
        Some(NavigationCommand::replace(routes::DASHBOARD_MEDICO))
    );
}

#[tokio::test]
async fn test_resolver_failure_on_role_route() {
    let (controller, session) = session_channel();
    controller.complete_login();

    let navigator = Arc::new(MemoryNavigator::new(routes::HOME));
    let resolver = Arc::new(FailingResolver::fetch_failed());
    let table = RouteTable::clinic_defaults(NavigationEpoch::new());
    let authorizer = RouteAuthorizer::new(table, session, resolver.clone(), navigator.clone());

    let decision = authorizer.authorize(routes::DASHBOARD_MEDICO).await;

    // The base guard already fails closed; the role guard never runs.
    assert_eq!(decision, Decision::redirect(routes::LOGIN));
    assert_eq!(resolver.calls(), 1);
}
