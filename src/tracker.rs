use std::sync::mpsc;

use crate::gps_processor::{GpsProcessor, Point, ProcessResult, RawData};
use crate::route::RoutePoint;
use strum_macros::{Display, EnumString};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AuthorizationStatus {
    NotDetermined,
    Authorized,
    // denied by the user or restricted by the system
    Denied,
}

impl AuthorizationStatus {
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Authorized => "Tracking walk routes",
            Self::Denied => "Enable location in Settings to track your path",
            Self::NotDetermined => "Requesting location permission...",
        }
    }
}

/// What the platform location source should do next.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StartAction {
    StartUpdating,
    RequestAuthorization,
    Nothing,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrackerEvent {
    AuthorizationChanged(AuthorizationStatus),
    LatestLocationChanged(Point),
    RoutePointRecorded(RoutePoint),
}

/// Per-session tracking state. Not persisted.
pub struct LocationTracker {
    authorization_status: AuthorizationStatus,
    gps_processor: GpsProcessor,
    subscribers: Vec<mpsc::Sender<TrackerEvent>>,
}

impl LocationTracker {
    pub fn new() -> Self {
        LocationTracker {
            authorization_status: AuthorizationStatus::NotDetermined,
            gps_processor: GpsProcessor::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.authorization_status
    }

    pub fn latest_location(&self) -> Option<&Point> {
        self.gps_processor.latest().map(|data| &data.point)
    }

    pub fn last_accepted(&self) -> Option<&RawData> {
        self.gps_processor.last_accepted()
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<TrackerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, event: TrackerEvent) {
        // drop subscribers whose receiver is gone
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn start(&self) -> StartAction {
        match self.authorization_status {
            AuthorizationStatus::Authorized => StartAction::StartUpdating,
            AuthorizationStatus::NotDetermined => StartAction::RequestAuthorization,
            AuthorizationStatus::Denied => StartAction::Nothing,
        }
    }

    pub fn on_authorization_change(&mut self, status: AuthorizationStatus) -> StartAction {
        if status != self.authorization_status {
            info!(
                "[tracker] authorization changed: {} -> {}",
                self.authorization_status, status
            );
        }
        self.authorization_status = status;
        self.notify(TrackerEvent::AuthorizationChanged(status));
        if status == AuthorizationStatus::Authorized {
            StartAction::StartUpdating
        } else {
            StartAction::Nothing
        }
    }

    /// Runs a single fix through the admission filter. Returns the route point
    /// to persist if the fix was accepted.
    pub fn on_location(&mut self, raw_data: &RawData) -> (ProcessResult, Option<RoutePoint>) {
        if !raw_data.is_valid() {
            return (ProcessResult::Reject, None);
        }
        let result = self.gps_processor.preprocess(raw_data);
        self.notify(TrackerEvent::LatestLocationChanged(raw_data.point.clone()));
        match result {
            ProcessResult::Reject => (result, None),
            ProcessResult::Accept => {
                let route_point = raw_data.to_route_point();
                self.notify(TrackerEvent::RoutePointRecorded(route_point.clone()));
                (result, Some(route_point))
            }
        }
    }
}
