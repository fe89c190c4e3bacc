use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::api::airlines::{Airline, AirlineDirectory};
use crate::api::schedule::{FlightQuery, FlightStatus};
use crate::api::{ApiClient, ApiError};
use crate::present::{self, LookupState, MSG_LOOKUP_FAILED};

/// How long a status message stays in the info line
const STATUS_MESSAGE_SECONDS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Airline,
    FlightNumber,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Completion events from background tasks, drained in `tick`
#[derive(Debug)]
pub enum AppEvent {
    /// Airline directory finished loading
    AirlinesLoaded(Vec<Airline>),
    /// A flight lookup finished; `seq` identifies which submission it was
    LookupFinished {
        seq: u64,
        result: Result<FlightStatus, ApiError>,
    },
}

pub struct App {
    pub field: Field,
    pub popup: Popup,

    // Form state
    pub airline_input: String,
    pub flight_number_input: String,
    pub date_input: String,

    // IATA code bound by the last dropdown selection; cleared when the
    // airline text is edited afterwards, since the text no longer
    // necessarily names that carrier
    pub selected_code: Option<String>,

    // Airline directory (written once by the load task, read-only after)
    pub directory: AirlineDirectory,

    // Dropdown state
    pub dropdown_open: bool,
    pub dropdown_selected: usize,

    // Lookup lifecycle. Only the event matching `lookup_seq` may update
    // the display; anything older is a stale response and is dropped.
    pub lookup: LookupState,
    lookup_seq: u64,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    // Frame counter driving the loading throbber
    pub ticks: u64,

    // Viewer's time zone, resolved once at startup
    tz: chrono_tz::Tz,

    client: ApiClient,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    /// Build the app and kick off the airline directory load in the
    /// background so the form is usable immediately.
    pub fn new(client: ApiClient) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        {
            let client = client.clone();
            let tx = events_tx.clone();
            tokio::spawn(async move {
                match client.fetch_airlines().await {
                    Ok(airlines) => {
                        let _ = tx.send(AppEvent::AirlinesLoaded(airlines));
                    }
                    // Autocomplete is a convenience; the form works without it
                    Err(e) => tracing::warn!("Failed to fetch airlines: {}", e),
                }
            });
        }

        Self {
            field: Field::Airline,
            popup: Popup::None,

            airline_input: String::new(),
            flight_number_input: String::new(),
            date_input: String::new(),

            selected_code: None,

            directory: AirlineDirectory::default(),

            dropdown_open: false,
            dropdown_selected: 0,

            lookup: LookupState::Idle,
            lookup_seq: 0,

            status_message: None,
            status_message_time: None,

            ticks: 0,

            tz: present::local_zone(),

            client,
            events_tx,
            events_rx,
        }
    }

    /// Set a status message (auto-clears after a few seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Airlines currently matching the input, in directory load order
    pub fn dropdown_matches(&self) -> Vec<&Airline> {
        self.directory.search(&self.airline_input)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup != Popup::None {
            self.handle_popup_key(key);
            return;
        }
        self.handle_form_key(key);
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::F(1) | KeyCode::Char('q')
        ) {
            self.popup = Popup::None;
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            // Navigation between fields; leaving a field dismisses the dropdown
            KeyCode::Tab => {
                if self.dropdown_visible() {
                    // Tab completes the highlighted airline, like clicking it
                    self.apply_selection();
                } else {
                    self.next_field();
                }
            }
            KeyCode::BackTab => self.prev_field(),

            // Dropdown navigation
            KeyCode::Down if self.dropdown_visible() => {
                let count = self.dropdown_matches().len();
                if count > 0 {
                    self.dropdown_selected = (self.dropdown_selected + 1) % count;
                }
            }
            KeyCode::Up if self.dropdown_visible() => {
                let count = self.dropdown_matches().len();
                if count > 0 {
                    self.dropdown_selected = self
                        .dropdown_selected
                        .checked_sub(1)
                        .unwrap_or(count - 1);
                }
            }

            // With no dropdown showing, arrows move between fields
            KeyCode::Down => self.next_field(),
            KeyCode::Up => self.prev_field(),

            KeyCode::Enter => {
                if self.dropdown_visible() {
                    self.apply_selection();
                } else {
                    self.submit();
                }
            }

            KeyCode::Esc => {
                self.dropdown_open = false;
            }

            KeyCode::F(1) => self.popup = Popup::Help,

            KeyCode::Backspace => {
                match self.field {
                    Field::Airline => {
                        self.airline_input.pop();
                        self.airline_edited();
                    }
                    Field::FlightNumber => {
                        self.flight_number_input.pop();
                    }
                    Field::Date => {
                        self.date_input.pop();
                    }
                }
            }

            KeyCode::Char(c) => match self.field {
                Field::Airline => {
                    self.airline_input.push(c);
                    self.airline_edited();
                }
                Field::FlightNumber => self.flight_number_input.push(c),
                Field::Date => self.date_input.push(c),
            },

            _ => {}
        }
    }

    fn next_field(&mut self) {
        self.dropdown_open = false;
        self.field = match self.field {
            Field::Airline => Field::FlightNumber,
            Field::FlightNumber => Field::Date,
            Field::Date => Field::Airline,
        };
    }

    fn prev_field(&mut self) {
        self.dropdown_open = false;
        self.field = match self.field {
            Field::Airline => Field::Date,
            Field::FlightNumber => Field::Airline,
            Field::Date => Field::FlightNumber,
        };
    }

    /// The airline text changed: the bound code no longer matches it, and
    /// the dropdown should re-open over the new matches
    fn airline_edited(&mut self) {
        self.selected_code = None;
        self.dropdown_open = true;
        self.dropdown_selected = 0;
    }

    fn dropdown_visible(&self) -> bool {
        self.field == Field::Airline && self.dropdown_open && !self.dropdown_matches().is_empty()
    }

    /// Bind the highlighted airline: display name into the input, IATA code
    /// into the slot the schedule request reads from
    pub fn apply_selection(&mut self) {
        let pick = self
            .dropdown_matches()
            .get(self.dropdown_selected)
            .map(|a| (a.name.clone(), a.iata_code.clone()));

        if let Some((name, code)) = pick {
            self.airline_input = name;
            self.selected_code = Some(code);
        }
        self.dropdown_open = false;
        self.dropdown_selected = 0;
    }

    /// Validate and, if the form is complete, spawn the lookup task
    pub fn submit(&mut self) {
        let query = FlightQuery {
            carrier_code: self.selected_code.clone().unwrap_or_default(),
            flight_number: self.flight_number_input.trim().to_string(),
            departure_date: self.date_input.trim().to_string(),
        };

        // Validation failures never touch the network
        if let Err(ApiError::Validation(msg)) = query.validate() {
            self.lookup = LookupState::Failed(msg);
            return;
        }

        self.lookup_seq += 1;
        let seq = self.lookup_seq;
        self.lookup = LookupState::Loading;

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.lookup_flight(&query).await;
            let _ = tx.send(AppEvent::LookupFinished { seq, result });
        });
    }

    /// Drain background-task events and expire the status message.
    /// Called from the main loop between draws.
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);

        while let Ok(event) = self.events_rx.try_recv() {
            self.on_event(event);
        }

        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_SECONDS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AirlinesLoaded(airlines) => {
                self.set_status(format!("Loaded {} airlines", airlines.len()));
                self.directory = AirlineDirectory::new(airlines);
            }
            AppEvent::LookupFinished { seq, result } => {
                if seq != self.lookup_seq {
                    // A newer submission superseded this one
                    tracing::debug!("Dropping stale lookup response (seq {})", seq);
                    return;
                }
                match result {
                    Ok(status) => {
                        self.lookup =
                            LookupState::Complete(present::format_status(&status, self.tz));
                    }
                    Err(ApiError::Validation(msg)) => {
                        self.lookup = LookupState::Failed(msg);
                    }
                    Err(e) => {
                        tracing::error!("Flight lookup failed: {}", e);
                        self.lookup = LookupState::Failed(MSG_LOOKUP_FAILED.to_string());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use chrono::DateTime;

    fn test_app() -> App {
        let config = AppConfig {
            base_url: "http://localhost:0".to_string(),
            client_id: "test".to_string(),
            client_secret: "test".to_string(),
        };
        App::new(ApiClient::new(&config))
    }

    fn loaded_app() -> App {
        let mut app = test_app();
        app.directory = AirlineDirectory::new(vec![
            Airline {
                name: "British Airways".to_string(),
                iata_code: "BA".to_string(),
            },
            Airline {
                name: "Brussels Airlines".to_string(),
                iata_code: "SN".to_string(),
            },
        ]);
        app
    }

    fn sample_status() -> FlightStatus {
        FlightStatus {
            departure: DateTime::parse_from_rfc3339("2024-03-01T09:25:00+00:00").unwrap(),
            arrival: DateTime::parse_from_rfc3339("2024-03-01T12:40:00-08:00").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_selection_binds_name_and_code() {
        let mut app = loaded_app();
        app.airline_input = "br".to_string();
        app.dropdown_open = true;
        app.dropdown_selected = 1;

        app.apply_selection();

        assert_eq!(app.airline_input, "Brussels Airlines");
        assert_eq!(app.selected_code.as_deref(), Some("SN"));
        assert!(!app.dropdown_open);
    }

    #[tokio::test]
    async fn test_editing_clears_bound_code() {
        let mut app = loaded_app();
        app.airline_input = "br".to_string();
        app.dropdown_open = true;
        app.apply_selection();
        assert!(app.selected_code.is_some());

        app.handle_key(KeyEvent::from(KeyCode::Char('x')));
        assert!(app.selected_code.is_none());
    }

    #[tokio::test]
    async fn test_submit_empty_fields_is_local() {
        let mut app = test_app();
        app.submit();

        // Validation failed before any task was spawned
        assert_eq!(
            app.lookup,
            LookupState::Failed(crate::api::schedule::MSG_FILL_ALL_FIELDS.to_string())
        );
        assert_eq!(app.lookup_seq, 0);
    }

    #[tokio::test]
    async fn test_submit_complete_form_goes_loading() {
        let mut app = loaded_app();
        app.selected_code = Some("BA".to_string());
        app.flight_number_input = "287".to_string();
        app.date_input = "2024-03-01".to_string();

        app.submit();

        assert_eq!(app.lookup, LookupState::Loading);
        assert_eq!(app.lookup_seq, 1);
    }

    #[tokio::test]
    async fn test_stale_lookup_response_is_dropped() {
        let mut app = test_app();
        app.lookup_seq = 2;
        app.lookup = LookupState::Loading;

        app.on_event(AppEvent::LookupFinished {
            seq: 1,
            result: Ok(sample_status()),
        });
        assert_eq!(app.lookup, LookupState::Loading);

        app.on_event(AppEvent::LookupFinished {
            seq: 2,
            result: Ok(sample_status()),
        });
        assert!(matches!(app.lookup, LookupState::Complete(_)));
    }

    #[tokio::test]
    async fn test_lookup_failure_shows_generic_message() {
        let mut app = test_app();
        app.lookup_seq = 1;
        app.lookup = LookupState::Loading;

        app.on_event(AppEvent::LookupFinished {
            seq: 1,
            result: Err(ApiError::DataShape("no matching flight".to_string())),
        });
        assert_eq!(app.lookup, LookupState::Failed(MSG_LOOKUP_FAILED.to_string()));
    }

    #[tokio::test]
    async fn test_airlines_loaded_populates_directory() {
        let mut app = test_app();
        assert!(app.directory.is_empty());

        app.on_event(AppEvent::AirlinesLoaded(vec![Airline {
            name: "Air France".to_string(),
            iata_code: "AF".to_string(),
        }]));
        assert_eq!(app.directory.len(), 1);
    }
}
