//! Tick-driven appliance controller
//!
//! [`Controller::tick`] performs exactly one step of whatever the
//! appliance is doing (one menu poll, one dialog poll, one toasting
//! iteration) and never blocks. The caller sleeps
//! [`Controller::poll_interval_ms`] between ticks.

use crate::config::{CalibrationCommand, CalibrationData, ToastParams};
use crate::elapsed_ms;
use crate::state::{Event, State};
use crate::toast::{ToastFlow, ToastSession};
use crate::traits::{DisplaySink, HeaterOutput, InputSource, SensorError, SensorSource};
use crate::ui::{Answer, ConfirmDialog, MainMenu, Navigation, View};

/// Tick interval while halted (ms)
pub const HALTED_POLL_MS: u32 = 1_000;

/// Why a calibration command was not executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Only allowed while the menu is showing
    Busy,
    /// The sensor rejected the command
    Sensor(SensorError),
}

impl From<SensorError> for CalibrationError {
    fn from(err: SensorError) -> Self {
        CalibrationError::Sensor(err)
    }
}

/// Appliance controller
///
/// Owns the sensors, input, display and heater. Exactly one toast run
/// can exist at a time; it lives in `flow` and is dropped when the run
/// finishes.
pub struct Controller<S, I, D, H> {
    sensors: S,
    input: I,
    display: D,
    heater: H,
    params: ToastParams,
    state: State,
    menu: MainMenu,
    dialog: ConfirmDialog,
    flow: Option<ToastFlow>,
    temp_guided: bool,
    awaiting_release: bool,
    boot_at_ms: u32,
    last_render_ms: u32,
    last_view: Option<View>,
}

impl<S, I, D, H> Controller<S, I, D, H>
where
    S: SensorSource,
    I: InputSource,
    D: DisplaySink,
    H: HeaterOutput,
{
    pub fn new(sensors: S, input: I, display: D, mut heater: H, params: ToastParams) -> Self {
        heater.set_on(false);
        Self {
            sensors,
            input,
            display,
            heater,
            params,
            state: State::Boot,
            menu: MainMenu::new(),
            dialog: ConfirmDialog::new(params.confirm),
            flow: None,
            temp_guided: false,
            awaiting_release: false,
            boot_at_ms: 0,
            last_render_ms: 0,
            last_view: None,
        }
    }

    /// Hand persisted calibration to the drivers; call before [`boot`](Self::boot)
    pub fn restore_calibration(&mut self, data: &CalibrationData) {
        self.sensors.restore_calibration(data);
    }

    /// Bring up the display and sensors and show the splash
    ///
    /// Without a display the controller halts for good. Sensor failures
    /// are only reported.
    pub fn boot(&mut self, now_ms: u32) -> Event {
        if !self.display.begin() {
            self.state = self.state.transition(Event::DisplayInitFailed);
            self.show(View::InitError);
            self.enforce_heater();
            return Event::DisplayInitFailed;
        }

        let report = self.sensors.begin_all();
        self.show(View::Splash);
        self.boot_at_ms = now_ms;
        Event::SensorsStarted(report)
    }

    /// Perform one step
    pub fn tick(&mut self, now_ms: u32) -> Option<Event> {
        let event = self.step(now_ms);
        self.enforce_heater();
        event
    }

    /// How long the caller should wait before the next tick (ms)
    pub fn poll_interval_ms(&self) -> u32 {
        if self.state == State::Halted {
            return HALTED_POLL_MS;
        }
        if self.awaiting_release {
            return self.params.ui_poll_ms;
        }
        if self.state.is_toasting_flow() {
            self.params.toast_poll_ms
        } else {
            self.params.ui_poll_ms
        }
    }

    /// Run a maintenance calibration command
    ///
    /// Refused unless the menu is showing, so calibration can never
    /// interfere with a toast run.
    pub fn handle_calibration(
        &mut self,
        command: CalibrationCommand,
    ) -> Result<Event, CalibrationError> {
        if !self.state.accepts_calibration() || self.awaiting_release {
            return Err(CalibrationError::Busy);
        }
        self.sensors.apply_calibration(command)?;
        Ok(Event::CalibrationChanged(command))
    }

    /// Current calibration constants, ready to persist
    pub fn calibration(&self) -> CalibrationData {
        self.sensors.calibration()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn params(&self) -> &ToastParams {
        &self.params
    }

    /// The running toast session, if the heater is on
    pub fn session(&self) -> Option<&ToastSession> {
        self.flow.as_ref().and_then(|flow| flow.session())
    }

    pub fn flow(&self) -> Option<&ToastFlow> {
        self.flow.as_ref()
    }

    pub fn heater_on(&self) -> bool {
        self.heater.is_on()
    }

    pub fn menu_index(&self) -> usize {
        self.menu.index()
    }

    fn step(&mut self, now_ms: u32) -> Option<Event> {
        match self.state {
            State::Halted => return None,
            State::Boot => {
                if elapsed_ms(now_ms, self.boot_at_ms) >= self.params.splash_ms {
                    return self.apply(Event::BootComplete, now_ms);
                }
                return None;
            }
            _ => {}
        }

        if self.awaiting_release {
            if self.input.button_held() {
                return None;
            }
            self.awaiting_release = false;
            self.enter(now_ms);
            return None;
        }

        self.sensors.poll_all(now_ms);

        match self.state {
            State::Menu => self.menu_step(now_ms),
            State::Confirm => self.dialog_step(now_ms),
            State::PlaceBread | State::Settling | State::Toasting => self.flow_step(now_ms),
            State::Sensors => self.showcase_step(now_ms),
            State::Ready | State::Logo => {
                if self.input.button_pressed(now_ms) {
                    self.apply(Event::Dismissed, now_ms)
                } else {
                    None
                }
            }
            State::Boot | State::Halted => None,
        }
    }

    fn menu_step(&mut self, now_ms: u32) -> Option<Event> {
        let delta = self.input.encoder_delta();
        let pressed = self.input.button_pressed(now_ms);

        match self.menu.handle(delta, pressed) {
            Navigation::Idle => None,
            Navigation::Moved => {
                self.show_menu();
                None
            }
            Navigation::Selected(mode) => self.apply(Event::ModeSelected(mode), now_ms),
        }
    }

    fn dialog_step(&mut self, now_ms: u32) -> Option<Event> {
        let delta = self.input.encoder_delta();
        let pressed = self.input.button_pressed(now_ms);

        match self.dialog.handle(delta, pressed) {
            Navigation::Idle => None,
            Navigation::Moved => {
                self.show_dialog();
                None
            }
            Navigation::Selected(Answer::Cancel) => self.apply(Event::ToastCancelled, now_ms),
            Navigation::Selected(answer) => self.apply(
                Event::ToastConfirmed {
                    temperature_guided: answer.temperature_guided(),
                },
                now_ms,
            ),
        }
    }

    fn flow_step(&mut self, now_ms: u32) -> Option<Event> {
        let snapshot = self.sensors.snapshot();
        let flow = self.flow.as_mut()?;
        let event = flow.step(&snapshot, now_ms);
        let view = flow.view();
        self.show(view);

        match event {
            Some(event) => self.apply(event, now_ms),
            None => None,
        }
    }

    fn showcase_step(&mut self, now_ms: u32) -> Option<Event> {
        if self.input.button_pressed(now_ms) {
            return self.apply(Event::Dismissed, now_ms);
        }
        if elapsed_ms(now_ms, self.last_render_ms) >= self.params.showcase_poll_ms {
            self.last_render_ms = now_ms;
            self.show(View::SensorShowcase(self.sensors.snapshot()));
        }
        None
    }

    /// Transition on `event` and run the new state's entry actions
    fn apply(&mut self, event: Event, now_ms: u32) -> Option<Event> {
        if let Event::ToastConfirmed { temperature_guided } = event {
            self.temp_guided = temperature_guided;
        }

        let next = self.state.transition(event);
        if next != self.state {
            self.state = next;
            if event.is_user_event() {
                self.awaiting_release = true;
            } else {
                self.enter(now_ms);
            }
        }

        Some(event)
    }

    fn enter(&mut self, now_ms: u32) {
        match self.state {
            State::Menu => {
                self.flow = None;
                self.menu.reset();
                self.input.reset();
                self.show_menu();
            }
            State::Confirm => {
                self.dialog = ConfirmDialog::new(self.params.confirm);
                self.input.reset();
                self.show_dialog();
            }
            State::PlaceBread => {
                self.sensors.poll_all(now_ms);
                let flow = ToastFlow::begin(
                    &self.sensors.snapshot(),
                    self.temp_guided,
                    now_ms,
                    &self.params,
                );
                self.show(flow.view());
                self.flow = Some(flow);
            }
            State::Toasting => {
                self.heater.set_on(true);
            }
            State::Ready => {
                self.flow = None;
                self.input.reset();
                self.show(View::ToastReady);
                // A press carried over from the run must not dismiss the screen
                if self.input.button_held() {
                    self.awaiting_release = true;
                }
            }
            State::Sensors => {
                self.input.reset();
                self.last_render_ms = now_ms;
                self.show(View::SensorShowcase(self.sensors.snapshot()));
            }
            State::Logo => {
                self.input.reset();
                self.show(View::Splash);
            }
            State::Boot | State::Settling | State::Halted => {}
        }
    }

    fn enforce_heater(&mut self) {
        if !self.state.heater_allowed() && self.heater.is_on() {
            self.heater.set_on(false);
        }
    }

    fn show_menu(&mut self) {
        if let Some(mode) = crate::ui::Mode::from_index(self.menu.index()) {
            self.show(View::ModeSelection { selected: mode });
        }
    }

    fn show_dialog(&mut self) {
        self.show(View::YesNo {
            question: self.dialog.question(),
            index: self.dialog.index() as u8,
        });
    }

    fn show(&mut self, view: View) {
        if self.last_view != Some(view) {
            self.display.render(view);
            self.last_view = Some(view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfirmKind;
    use crate::sensors::{BeginReport, SensorSnapshot};
    use crate::toast::Termination;
    use crate::ui::{Mode, Question};

    extern crate std;
    use std::vec::Vec;

    struct FakeSensors {
        snapshot: SensorSnapshot,
        report: BeginReport,
        polls: u32,
        commands: Vec<CalibrationCommand>,
    }

    impl SensorSource for FakeSensors {
        fn begin_all(&mut self) -> BeginReport {
            self.report
        }
        fn poll_all(&mut self, _now_ms: u32) {
            self.polls += 1;
        }
        fn snapshot(&self) -> SensorSnapshot {
            self.snapshot
        }
        fn apply_calibration(&mut self, command: CalibrationCommand) -> Result<(), SensorError> {
            if let CalibrationCommand::Calibrate { known_mass_g } = command {
                if known_mass_g <= 0.0 {
                    return Err(SensorError::InvalidArgument);
                }
            }
            self.commands.push(command);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeInput {
        delta: i32,
        press: bool,
        held: bool,
        resets: u32,
    }

    impl InputSource for FakeInput {
        fn encoder_delta(&mut self) -> i32 {
            core::mem::take(&mut self.delta)
        }
        fn button_pressed(&mut self, _now_ms: u32) -> bool {
            core::mem::take(&mut self.press)
        }
        fn button_held(&mut self) -> bool {
            self.held
        }
        fn reset(&mut self) {
            self.delta = 0;
            self.press = false;
            self.resets += 1;
        }
    }

    struct FakeDisplay {
        ok: bool,
        views: Vec<View>,
    }

    impl DisplaySink for FakeDisplay {
        fn begin(&mut self) -> bool {
            self.ok
        }
        fn render(&mut self, view: View) {
            self.views.push(view);
        }
    }

    #[derive(Default)]
    struct FakeHeater {
        on: bool,
        switches: u32,
    }

    impl HeaterOutput for FakeHeater {
        fn set_on(&mut self, on: bool) {
            if on != self.on {
                self.switches += 1;
            }
            self.on = on;
        }
        fn is_on(&self) -> bool {
            self.on
        }
    }

    type TestController = Controller<FakeSensors, FakeInput, FakeDisplay, FakeHeater>;

    fn controller(params: ToastParams) -> TestController {
        Controller::new(
            FakeSensors {
                snapshot: SensorSnapshot::new(20.0, 0.0),
                report: BeginReport {
                    weight: true,
                    temperature: true,
                    color: true,
                },
                polls: 0,
                commands: Vec::new(),
            },
            FakeInput::default(),
            FakeDisplay {
                ok: true,
                views: Vec::new(),
            },
            FakeHeater::default(),
            params,
        )
    }

    /// Boot and wait out the splash
    fn booted(params: ToastParams) -> (TestController, u32) {
        let mut c = controller(params);
        c.boot(0);
        let now = params.splash_ms;
        assert_eq!(c.tick(now), Some(Event::BootComplete));
        assert_eq!(c.state(), State::Menu);
        (c, now)
    }

    fn press(c: &mut TestController, now: u32) -> Option<Event> {
        c.input.press = true;
        c.input.held = true;
        let event = c.tick(now);
        c.input.held = false;
        event
    }

    fn last_view(c: &TestController) -> Option<View> {
        c.display.views.last().copied()
    }

    #[test]
    fn test_boot_reports_sensors_and_shows_splash() {
        let mut c = controller(ToastParams::default());
        c.sensors.report.color = false;
        let event = c.boot(100);
        match event {
            Event::SensorsStarted(report) => {
                assert!(report.weight);
                assert!(!report.color);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(last_view(&c), Some(View::Splash));
        assert_eq!(c.tick(1_000), None);
        assert_eq!(c.state(), State::Boot);
        assert_eq!(c.tick(2_100), Some(Event::BootComplete));
        assert_eq!(
            last_view(&c),
            Some(View::ModeSelection {
                selected: Mode::Toast
            })
        );
    }

    #[test]
    fn test_display_failure_halts() {
        let mut c = controller(ToastParams::default());
        c.display.ok = false;
        assert_eq!(c.boot(0), Event::DisplayInitFailed);
        assert_eq!(c.state(), State::Halted);
        assert_eq!(last_view(&c), Some(View::InitError));
        assert_eq!(c.tick(10_000), None);
        assert_eq!(c.state(), State::Halted);
        assert_eq!(c.poll_interval_ms(), HALTED_POLL_MS);
    }

    #[test]
    fn test_menu_rotation_and_redraw() {
        let (mut c, mut now) = booted(ToastParams::default());
        c.input.delta = -1;
        now += 10;
        assert_eq!(c.tick(now), None);
        assert_eq!(c.menu_index(), 2);
        assert_eq!(
            last_view(&c),
            Some(View::ModeSelection {
                selected: Mode::Logo
            })
        );

        for _ in 0..3 {
            c.input.delta = 1;
            now += 10;
            c.tick(now);
        }
        assert_eq!(c.menu_index(), 2);
    }

    #[test]
    fn test_selection_waits_for_release() {
        let (mut c, mut now) = booted(ToastParams::default());
        c.input.press = true;
        c.input.held = true;
        now += 10;
        assert_eq!(c.tick(now), Some(Event::ModeSelected(Mode::Toast)));
        assert_eq!(c.state(), State::Confirm);

        // Still held: dialog not drawn yet
        now += 10;
        c.tick(now);
        assert!(!matches!(last_view(&c), Some(View::YesNo { .. })));

        c.input.held = false;
        now += 10;
        c.tick(now);
        assert_eq!(
            last_view(&c),
            Some(View::YesNo {
                question: Question::TemperatureJig,
                index: 0
            })
        );
    }

    #[test]
    fn test_menu_returns_to_first_entry() {
        let (mut c, mut now) = booted(ToastParams::default());
        c.input.delta = 1;
        now += 10;
        c.tick(now);
        now += 10;
        assert_eq!(press(&mut c, now), Some(Event::ModeSelected(Mode::Sensors)));
        now += 10;
        c.tick(now);
        now += 10;
        assert_eq!(press(&mut c, now), Some(Event::Dismissed));
        now += 10;
        c.tick(now);
        assert_eq!(c.state(), State::Menu);
        assert_eq!(c.menu_index(), 0);
    }

    #[test]
    fn test_start_toasting_no_returns_to_menu() {
        let params = ToastParams {
            confirm: ConfirmKind::StartToasting,
            ..Default::default()
        };
        let (mut c, mut now) = booted(params);
        now += 10;
        press(&mut c, now);
        now += 10;
        c.tick(now);
        now += 10;
        assert_eq!(press(&mut c, now), Some(Event::ToastCancelled));
        now += 10;
        c.tick(now);
        assert_eq!(c.state(), State::Menu);
        assert!(c.flow().is_none());
    }

    #[test]
    fn test_start_toasting_yes_is_weight_only() {
        let params = ToastParams {
            confirm: ConfirmKind::StartToasting,
            ..Default::default()
        };
        let (mut c, mut now) = booted(params);
        now += 10;
        press(&mut c, now);
        now += 10;
        c.tick(now);
        c.input.delta = 1;
        now += 10;
        c.tick(now);
        now += 10;
        assert_eq!(
            press(&mut c, now),
            Some(Event::ToastConfirmed {
                temperature_guided: false
            })
        );
        now += 10;
        c.tick(now);
        assert_eq!(c.state(), State::PlaceBread);
        assert_eq!(c.flow().map(|f| f.temp_guided()), Some(false));
    }

    /// Drive the controller from the menu into an active toast session
    fn into_toasting(c: &mut TestController, mut now: u32, guided: bool) -> u32 {
        now += 10;
        press(c, now);
        now += 10;
        c.tick(now);
        if !guided {
            c.input.delta = 1;
            now += 10;
            c.tick(now);
        }
        now += 10;
        press(c, now);
        now += 10;
        c.tick(now);
        assert_eq!(c.state(), State::PlaceBread);
        assert!(!c.heater_on());

        c.sensors.snapshot = SensorSnapshot::new(20.0, 200.0);
        now += 50;
        assert_eq!(c.tick(now), Some(Event::BreadPlaced { weight_g: 200.0 }));
        assert_eq!(c.state(), State::Settling);
        assert!(!c.heater_on());

        let mut event = None;
        while event.is_none() {
            now += 50;
            event = c.tick(now);
        }
        assert_eq!(
            event,
            Some(Event::WeightSettled {
                start_weight_g: 200.0
            })
        );
        assert_eq!(c.state(), State::Toasting);
        assert!(c.heater_on());
        now
    }

    #[test]
    fn test_weight_only_toast_run() {
        let (mut c, now) = booted(ToastParams::default());
        let mut now = into_toasting(&mut c, now, false);
        assert_eq!(c.poll_interval_ms(), 50);

        c.sensors.snapshot = SensorSnapshot::new(150.0, 190.0);
        now += 50;
        assert_eq!(c.tick(now), None);
        let progress = match last_view(&c) {
            Some(View::Toasting { progress }) => progress,
            other => panic!("unexpected {:?}", other),
        };
        assert!(crate::abs_diff(progress, 0.5) < 1e-3);

        c.sensors.snapshot = SensorSnapshot::new(150.0, 179.0);
        now += 50;
        assert_eq!(
            c.tick(now),
            Some(Event::ToastFinished(Termination::WeightTarget))
        );
        assert_eq!(c.state(), State::Ready);
        assert!(!c.heater_on());
        assert!(c.session().is_none());
        assert_eq!(last_view(&c), Some(View::ToastReady));

        now += 10;
        assert_eq!(press(&mut c, now), Some(Event::Dismissed));
        now += 10;
        c.tick(now);
        assert_eq!(c.state(), State::Menu);
        assert_eq!(c.menu_index(), 0);
    }

    #[test]
    fn test_ready_needs_fresh_press() {
        let (mut c, now) = booted(ToastParams::default());
        let mut now = into_toasting(&mut c, now, false);

        // Button goes down while toasting and stays down past the finish
        c.input.held = true;
        c.input.press = true;
        c.sensors.snapshot = SensorSnapshot::new(150.0, 179.0);
        now += 50;
        assert_eq!(
            c.tick(now),
            Some(Event::ToastFinished(Termination::WeightTarget))
        );
        assert_eq!(c.state(), State::Ready);
        assert!(!c.heater_on());

        c.input.press = true;
        now += 20;
        assert_eq!(c.tick(now), None);
        assert_eq!(c.state(), State::Ready);

        c.input.held = false;
        now += 10;
        assert_eq!(c.tick(now), None);
        now += 10;
        assert_eq!(c.tick(now), None);
        assert_eq!(c.state(), State::Ready);
        assert_eq!(last_view(&c), Some(View::ToastReady));

        now += 10;
        assert_eq!(press(&mut c, now), Some(Event::Dismissed));
    }

    #[test]
    fn test_guided_run_terminates_on_temperature_hold() {
        let (mut c, now) = booted(ToastParams::default());
        let mut now = into_toasting(&mut c, now, true);
        assert_eq!(c.session().map(|s| s.temp_guided), Some(true));

        c.sensors.snapshot = SensorSnapshot::new(120.0, 195.0);
        let mut event = None;
        while event.is_none() {
            now += 50;
            event = c.tick(now);
            if event.is_none() {
                assert!(c.heater_on());
            }
        }
        assert_eq!(event, Some(Event::ToastFinished(Termination::TemperatureHold)));
        assert!(!c.heater_on());
    }

    #[test]
    fn test_failsafe_turns_heater_off() {
        let (mut c, now) = booted(ToastParams::default());
        let started = into_toasting(&mut c, now, false);
        let mut now = started;

        // Scale stuck, temperature never settles
        c.sensors.snapshot = SensorSnapshot::new(f32::NAN, 200.0);
        let mut event = None;
        while event.is_none() {
            now += 50;
            event = c.tick(now);
        }
        assert_eq!(event, Some(Event::ToastFinished(Termination::FailSafe)));
        assert_eq!(now - started, 300_000);
        assert!(!c.heater_on());
        assert_eq!(c.heater.switches, 2);
    }

    #[test]
    fn test_calibration_only_in_menu() {
        let (mut c, mut now) = booted(ToastParams::default());
        assert_eq!(
            c.handle_calibration(CalibrationCommand::Tare),
            Ok(Event::CalibrationChanged(CalibrationCommand::Tare))
        );
        assert_eq!(
            c.handle_calibration(CalibrationCommand::Calibrate { known_mass_g: 0.0 }),
            Err(CalibrationError::Sensor(SensorError::InvalidArgument))
        );

        now += 10;
        press(&mut c, now);
        assert_eq!(
            c.handle_calibration(CalibrationCommand::SetBaseline),
            Err(CalibrationError::Busy)
        );
        assert_eq!(c.sensors.commands, [CalibrationCommand::Tare]);
    }

    #[test]
    fn test_showcase_refresh_rate() {
        let (mut c, mut now) = booted(ToastParams::default());
        c.input.delta = 1;
        now += 10;
        c.tick(now);
        now += 10;
        press(&mut c, now);
        now += 10;
        c.tick(now);
        assert_eq!(c.state(), State::Sensors);
        let rendered = c.display.views.len();

        c.sensors.snapshot = SensorSnapshot::new(21.0, 3.0);
        now += 50;
        c.tick(now);
        assert_eq!(c.display.views.len(), rendered);

        now += 50;
        c.tick(now);
        assert_eq!(
            last_view(&c),
            Some(View::SensorShowcase(SensorSnapshot::new(21.0, 3.0)))
        );
    }

    #[test]
    fn test_stale_press_discarded_on_menu_entry() {
        let mut c = controller(ToastParams::default());
        c.boot(0);
        c.input.press = true;
        c.tick(2_000);
        assert_eq!(c.state(), State::Menu);
        assert_eq!(c.tick(2_010), None);
        assert_eq!(c.state(), State::Menu);
    }

    #[test]
    fn test_sensors_polled_every_tick() {
        let (mut c, mut now) = booted(ToastParams::default());
        let before = c.sensors.polls;
        for _ in 0..5 {
            now += 10;
            c.tick(now);
        }
        assert_eq!(c.sensors.polls, before + 5);
    }
}
