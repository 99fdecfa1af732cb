//! The dashboard page: controller wiring plus its panels.

mod controller;
pub use controller::{
    DashboardController, DayWindow, Fetch, FetchOutcome, FetchTicket, FilterState, Resource, Slot,
};

mod filters;
pub use filters::DashboardFilters;

mod cards;
pub use cards::StatsCards;

mod charts;
pub use charts::ChartsGrid;

mod table;
pub use table::ChoicesTable;

mod export;
pub use export::ExportPanel;

use api::ApiClient;
use dioxus::prelude::*;
use futures_util::StreamExt;
use tracing::debug;

use crate::core::error::LoadError;
use crate::core::records::ChoiceField;

/// What the panels can ask the controller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    SelectMachine(String),
    SelectWindow(DayWindow),
    ToggleSort(ChoiceField),
    Refresh,
}

/// Shared by every panel through context.
#[derive(Clone, Copy)]
pub struct DashboardHandle {
    pub state: Signal<DashboardController>,
    events: Coroutine<DashboardEvent>,
}

impl DashboardHandle {
    pub fn send(&self, event: DashboardEvent) {
        self.events.send(event);
    }
}

/// Runs the controller event loop and starts the initial load.
///
/// `client` is `Err` when the backend URL could not be parsed; every fetch then
/// settles as failed with that reason instead of being attempted.
pub fn use_dashboard(client: Result<ApiClient, String>, limit: u32) -> DashboardHandle {
    let state = use_signal(DashboardController::new);

    let events = use_coroutine(move |mut rx: UnboundedReceiver<DashboardEvent>| {
        let client = client.clone();
        let mut state = state;
        async move {
            let tickets = state.write().start();
            dispatch(state, &client, limit, tickets);

            while let Some(event) = rx.next().await {
                debug!(?event, "dashboard event");
                let tickets = {
                    let mut controller = state.write();
                    match event {
                        DashboardEvent::SelectMachine(machine) => controller.set_machine(machine),
                        DashboardEvent::SelectWindow(window) => controller.set_window(window),
                        DashboardEvent::ToggleSort(field) => {
                            controller.toggle_sort(field);
                            Vec::new()
                        }
                        DashboardEvent::Refresh => controller.refresh(),
                    }
                };
                dispatch(state, &client, limit, tickets);
            }
        }
    });

    DashboardHandle { state, events }
}

/// One task per ticket; each result is applied as soon as it arrives.
fn dispatch(
    state: Signal<DashboardController>,
    client: &Result<ApiClient, String>,
    limit: u32,
    tickets: Vec<FetchTicket>,
) {
    for ticket in tickets {
        let client = client.clone();
        let mut state = state;
        spawn(async move {
            let outcome = load(&client, ticket, limit).await;
            state.write().apply(outcome);
        });
    }
}

/// Fetches and decodes the resource a ticket stands for.
pub async fn load(
    client: &Result<ApiClient, String>,
    ticket: FetchTicket,
    limit: u32,
) -> FetchOutcome {
    let body = match client {
        Ok(client) => client
            .fetch(&ticket.endpoint(limit))
            .await
            .map_err(LoadError::from),
        Err(reason) => Err(LoadError::Config(reason.clone())),
    };
    ticket.resolve(body)
}
