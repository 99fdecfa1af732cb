//! Filter and fetch state for the dashboard, kept free of any UI types.
//!
//! Every filter change bumps a per-resource generation and hands back one
//! [`FetchTicket`] per resource. A result is only applied when its ticket
//! still carries the latest generation, so a slow response for an old filter
//! can never overwrite the data of a newer one.

use api::Endpoint;
use tracing::{debug, warn};

use crate::core::error::LoadError;
use crate::core::records::{
    decode_choices, decode_machines, decode_stats, Choice, ChoiceField, ChoicePage, Machine, Stats,
};
use crate::core::sort::SortState;

/// Reporting period offered by the period filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayWindow {
    Today,
    Week,
    Month,
    Quarter,
    Year,
}

impl DayWindow {
    pub const ALL: [DayWindow; 5] = [
        DayWindow::Today,
        DayWindow::Week,
        DayWindow::Month,
        DayWindow::Quarter,
        DayWindow::Year,
    ];

    pub fn days(self) -> u16 {
        match self {
            DayWindow::Today => 1,
            DayWindow::Week => 7,
            DayWindow::Month => 30,
            DayWindow::Quarter => 90,
            DayWindow::Year => 365,
        }
    }

    pub fn from_days(days: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|window| window.days() == days)
    }

    /// Localization key of the option label.
    pub fn label_key(self) -> &'static str {
        match self {
            DayWindow::Today => "filter-window-today",
            DayWindow::Week => "filter-window-week",
            DayWindow::Month => "filter-window-month",
            DayWindow::Quarter => "filter-window-quarter",
            DayWindow::Year => "filter-window-year",
        }
    }
}

/// Active filters. An empty `machine` means every machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub machine: String,
    pub window: DayWindow,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            machine: String::new(),
            window: DayWindow::Week,
        }
    }
}

/// Lifecycle of one fetched resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Fetch<T> {
    fn default() -> Self {
        Fetch::Idle
    }
}

impl<T> Fetch<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Fetch::Loading | Fetch::Idle)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Fetch::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the ready value, keeping the loading/failed state as is.
    pub fn project<U>(&self, f: impl FnOnce(&T) -> U) -> Fetch<U> {
        match self {
            Fetch::Idle => Fetch::Idle,
            Fetch::Loading => Fetch::Loading,
            Fetch::Ready(value) => Fetch::Ready(f(value)),
            Fetch::Failed(reason) => Fetch::Failed(reason.clone()),
        }
    }
}

/// A `Fetch` plus the generation of the request it is waiting for.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    state: Fetch<T>,
    generation: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: Fetch::Idle,
            generation: 0,
        }
    }
}

impl<T> Slot<T> {
    pub fn state(&self) -> &Fetch<T> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks the slot as loading and returns the generation to settle with.
    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = Fetch::Loading;
        self.generation
    }

    /// Applies a result unless a newer request has started since.
    fn settle(&mut self, generation: u64, result: Result<T, LoadError>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.state = match result {
            Ok(value) => Fetch::Ready(value),
            Err(err) => Fetch::Failed(err.to_string()),
        };
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Machines,
    Stats,
    Choices,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Machines, Resource::Stats, Resource::Choices];

    pub fn name(self) -> &'static str {
        match self {
            Resource::Machines => "machines",
            Resource::Stats => "stats",
            Resource::Choices => "choices",
        }
    }
}

/// One request to issue, stamped with the filter it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub resource: Resource,
    pub generation: u64,
    pub filter: FilterState,
}

impl FetchTicket {
    pub fn endpoint(&self, limit: u32) -> Endpoint {
        let machine = self.filter.machine.clone();
        let days = self.filter.window.days();
        match self.resource {
            Resource::Machines => Endpoint::Machines,
            Resource::Stats => Endpoint::Stats { machine, days },
            Resource::Choices => Endpoint::Choices {
                machine,
                days,
                limit,
            },
        }
    }

    /// Decodes a response body into the outcome for this ticket.
    pub fn resolve(self, body: Result<String, LoadError>) -> FetchOutcome {
        let generation = self.generation;
        match self.resource {
            Resource::Machines => FetchOutcome::Machines {
                generation,
                result: body.and_then(|body| decode_machines(&body).map_err(LoadError::from)),
            },
            Resource::Stats => FetchOutcome::Stats {
                generation,
                result: body.and_then(|body| decode_stats(&body).map_err(LoadError::from)),
            },
            Resource::Choices => FetchOutcome::Choices {
                generation,
                result: body.and_then(|body| decode_choices(&body).map_err(LoadError::from)),
            },
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Machines {
        generation: u64,
        result: Result<Vec<Machine>, LoadError>,
    },
    Stats {
        generation: u64,
        result: Result<Stats, LoadError>,
    },
    Choices {
        generation: u64,
        result: Result<ChoicePage, LoadError>,
    },
}

impl FetchOutcome {
    pub fn resource(&self) -> Resource {
        match self {
            FetchOutcome::Machines { .. } => Resource::Machines,
            FetchOutcome::Stats { .. } => Resource::Stats,
            FetchOutcome::Choices { .. } => Resource::Choices,
        }
    }
}

/// Single owner of filter, fetch and sort state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardController {
    filter: FilterState,
    machines: Slot<Vec<Machine>>,
    stats: Slot<Stats>,
    choices: Slot<ChoicePage>,
    sort: SortState,
}

impl DashboardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn machines(&self) -> &Fetch<Vec<Machine>> {
        self.machines.state()
    }

    pub fn stats(&self) -> &Fetch<Stats> {
        self.stats.state()
    }

    pub fn choices(&self) -> &Fetch<ChoicePage> {
        self.choices.state()
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Initial load with the default filters.
    pub fn start(&mut self) -> Vec<FetchTicket> {
        self.begin_all()
    }

    /// Reloads everything for the current filters.
    pub fn refresh(&mut self) -> Vec<FetchTicket> {
        self.begin_all()
    }

    pub fn set_machine(&mut self, machine: impl Into<String>) -> Vec<FetchTicket> {
        let machine = machine.into();
        if self.filter.machine == machine {
            return Vec::new();
        }
        self.filter.machine = machine;
        self.begin_all()
    }

    pub fn set_window(&mut self, window: DayWindow) -> Vec<FetchTicket> {
        if self.filter.window == window {
            return Vec::new();
        }
        self.filter.window = window;
        self.begin_all()
    }

    /// Applies a finished fetch. Returns `false` when it was superseded.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        let resource = outcome.resource();
        let (generation, applied, failure) = match outcome {
            FetchOutcome::Machines { generation, result } => {
                let failure = result.as_ref().err().map(ToString::to_string);
                (generation, self.machines.settle(generation, result), failure)
            }
            FetchOutcome::Stats { generation, result } => {
                let failure = result.as_ref().err().map(ToString::to_string);
                (generation, self.stats.settle(generation, result), failure)
            }
            FetchOutcome::Choices { generation, result } => {
                let failure = result.as_ref().err().map(ToString::to_string);
                (generation, self.choices.settle(generation, result), failure)
            }
        };

        match (applied, failure) {
            (false, _) => debug!(resource = resource.name(), generation, "dropping superseded result"),
            (true, Some(reason)) => warn!(resource = resource.name(), generation, %reason, "load failed"),
            (true, None) => debug!(resource = resource.name(), generation, "loaded"),
        }
        applied
    }

    pub fn toggle_sort(&mut self, field: ChoiceField) {
        self.sort.toggle(field);
    }

    /// Loaded choices in display order; empty unless the choices are ready.
    pub fn sorted_choices(&self) -> Vec<Choice> {
        self.choices
            .state()
            .ready()
            .map(|page| self.sort.apply(&page.choices))
            .unwrap_or_default()
    }

    fn begin_all(&mut self) -> Vec<FetchTicket> {
        Resource::ALL
            .into_iter()
            .map(|resource| {
                let generation = match resource {
                    Resource::Machines => self.machines.begin(),
                    Resource::Stats => self.stats.begin(),
                    Resource::Choices => self.choices.begin(),
                };
                debug!(
                    resource = resource.name(),
                    generation,
                    machine = %self.filter.machine,
                    days = self.filter.window.days(),
                    "fetch started"
                );
                FetchTicket {
                    resource,
                    generation,
                    filter: self.filter.clone(),
                }
            })
            .collect()
    }
}
