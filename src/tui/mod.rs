use std::io;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use view::knob_bank::Knob;
use view::list::{ListState, Row};
use view::text_input::TextInputState;
use view::{KnobBank, List, PadGrid, ScrollView, TabBar, TextInput, XyPad, centered_rect};

use crate::catalog::{self, KNOB_COUNT};
use crate::config;
use crate::controller::{ControlError, Controller};
use crate::midi::{MidiOut, PadListener, RawEvent, Transport};
use crate::pads::{self, PadCell};
use crate::preset::{FileStorage, PresetError, PresetStore, Storage};

const TAB_NAMES: &[&str] = &["(1) Control", "(2) Presets", "(3) Help"];
const TAB_CONTROL: usize = 0;
const TAB_PRESETS: usize = 1;
const TAB_HELP: usize = 2;

const FINE_STEP: i32 = 1;
const COARSE_STEP: i32 = 8;
const NAME_LIMIT: usize = 40;
const DEVICE_POLL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

enum Popup {
    /// Pick the parameter slot behind the focused knob.
    Map(ListState),
    SaveName(TextInputState),
    ConfirmDelete(String),
}

#[derive(Default, Clone)]
struct Areas {
    tab: Rect,
    bus_bar: Rect,
    action_bar: Rect,
    effects_inner: Rect,
    knobs_inner: Rect,
    xy_inner: Rect,
    presets_inner: Rect,
    help: Rect,
    popup_inner: Rect,
}

struct State<T, S> {
    active_tab: usize,
    controller: Controller<T>,
    store: PresetStore<S>,
    effect_state: ListState,
    preset_state: ListState,
    focused_knob: usize,
    popup: Option<Popup>,
    status: Option<String>,
    port_label: String,
    store_label: String,
    help_lines: Vec<String>,
    help_offset: usize,
    help_scrollbar_dragging: bool,
    knob_dragging: Option<usize>,
    xy_dragging: bool,
    last_xy: Option<(u8, u8)>,
    last_pad: Option<PadCell>,
    pad_inputs: usize,
    invert_y: bool,
    areas: Areas,
    quit: bool,
}

impl<T: Transport, S: Storage> State<T, S> {
    fn new(controller: Controller<T>, store: PresetStore<S>, invert_y: bool) -> Self {
        let mut s = State {
            active_tab: TAB_CONTROL,
            preset_state: ListState::new(store.len()),
            effect_state: ListState::default(),
            controller,
            store,
            focused_knob: 0,
            popup: None,
            status: None,
            port_label: String::new(),
            store_label: String::new(),
            help_lines: build_help_lines(),
            help_offset: 0,
            help_scrollbar_dragging: false,
            knob_dragging: None,
            xy_dragging: false,
            last_xy: None,
            last_pad: None,
            pad_inputs: 0,
            invert_y,
            areas: Areas::default(),
            quit: false,
        };
        s.sync_effect_list();
        s
    }

    fn bus(&self) -> usize {
        self.controller.selected_bus()
    }

    /// Point the effect list at the selected bus and its live effect.
    fn sync_effect_list(&mut self) {
        let bus = self.bus();
        self.effect_state.set_len(catalog::effects_for(bus).len());
        if let Ok(b) = self.controller.bus(bus) {
            self.effect_state.select(b.effect_index);
        }
    }

    fn report(&mut self, result: Result<(), ControlError>) {
        if let Err(e) = result {
            self.status = Some(e.to_string());
        }
    }

    fn select_bus(&mut self, bus: usize) {
        let result = self.controller.select_bus(bus);
        self.report(result);
        self.last_xy = None;
        self.sync_effect_list();
    }

    fn cycle_bus(&mut self, forward: bool) {
        let count = catalog::BUS_COUNT;
        let bus = self.bus();
        let next = if forward { (bus + 1) % count } else { (bus + count - 1) % count };
        self.select_bus(next);
    }

    fn apply_effect(&mut self, index: usize) {
        let result = self.controller.select_effect_here(index);
        if result.is_ok() {
            self.status = None;
            self.last_xy = None;
        }
        self.report(result);
    }

    fn knob_value(&self, knob: usize) -> u8 {
        self.controller
            .bus(self.bus())
            .map_or(0, |b| b.knob_value(knob))
    }

    fn nudge_knob(&mut self, delta: i32) {
        let value = self.knob_value(self.focused_knob) as i32 + delta;
        let result = self.controller.set_knob_here(self.focused_knob, value);
        self.report(result);
    }

    fn set_knob(&mut self, knob: usize, value: u8) {
        if self.knob_value(knob) == value {
            return;
        }
        let result = self.controller.set_knob_here(knob, value as i32);
        self.report(result);
    }

    /// Pointer at (col, row) on the X/Y pad. Repeated positions are dropped.
    fn drag_xy(&mut self, col: u16, row: u16) {
        let (x, y) = XyPad::values_at(col, row, self.areas.xy_inner, self.invert_y);
        if self.last_xy == Some((x, y)) {
            return;
        }
        self.last_xy = Some((x, y));
        let result = self.controller.set_xy_here(x as i32, y as i32);
        self.report(result);
    }

    fn open_map(&mut self) {
        let slot = self
            .controller
            .bus(self.bus())
            .map_or(0, |b| b.slot_for(self.focused_knob));
        let mut list = ListState::new(KNOB_COUNT);
        list.select(slot);
        self.popup = Some(Popup::Map(list));
    }

    fn remap_focused(&mut self, slot: usize) {
        let result = self.controller.remap_knob_here(self.focused_knob, slot);
        if result.is_ok() {
            self.status = Some(format!(
                "Knob {} -> {}",
                self.focused_knob + 1,
                self.controller.label_for(self.bus(), self.focused_knob)
            ));
        }
        self.report(result);
    }

    fn selected_preset(&self) -> Option<String> {
        self.store
            .names()
            .nth(self.preset_state.selected)
            .map(str::to_string)
    }

    fn load_selected_preset(&mut self) {
        let Some(name) = self.selected_preset() else {
            return;
        };
        if self.store.load(&name, &mut self.controller) {
            self.status = Some(format!("Loaded '{name}'"));
            self.last_xy = None;
            self.sync_effect_list();
        }
    }

    fn save_preset(&mut self, name: &str) {
        match self.store.save(name, "", self.controller.state()) {
            Ok(()) => {
                let name = name.trim();
                self.preset_state.set_len(self.store.len());
                if let Some(index) = self.store.names().position(|n| n == name) {
                    self.preset_state.select(index);
                }
                self.status = Some(format!("Saved '{name}'"));
            }
            Err(PresetError::EmptyName) => {
                self.status = Some("Enter a name to save a preset".into());
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn delete_preset(&mut self, name: &str) {
        match self.store.delete(name, |_| true) {
            Ok(true) => {
                self.preset_state.set_len(self.store.len());
                self.status = Some(format!("Deleted '{name}'"));
            }
            Ok(false) => {}
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn handle_pad(&mut self, event: RawEvent) {
        if let Some(cell) = pads::decode(event) {
            self.last_pad = Some(cell);
        }
    }
}

pub fn run(controller: Controller<MidiOut>, store: PresetStore<FileStorage>) -> anyhow::Result<()> {
    let port_label = match controller.transport().port_name() {
        Some(name) => name.to_string(),
        None => "OFFLINE".to_string(),
    };
    let connected = controller.transport().is_connected();
    let store_label = store.storage().path().display().to_string();

    let mut s = State::new(controller, store, config::invert_y());
    s.port_label = port_label;
    s.store_label = store_label;
    if !connected {
        s.status = Some(format!(
            "No MIDI output matching '{}': running offline",
            config::device_name()
        ));
    }

    let (pad_tx, pad_rx) = crossbeam_channel::bounded::<RawEvent>(256);
    let mut listener = PadListener::new(pad_tx, config::device_name(), config::client_name());
    if let Err(e) = listener.open_ports() {
        log::warn!("Pad monitor unavailable: {e}");
    }
    s.pad_inputs = listener.connection_count();

    // Set up terminal.
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Logging would draw over the alternate screen. Keep it when stderr is
    // redirected (`sp404ctl 2> debug.log`).
    let prev_log_level = log::max_level();
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        log::set_max_level(log::LevelFilter::Off);
    }

    let result = event_loop(&mut terminal, &mut s, &pad_rx, &mut listener);

    log::set_max_level(prev_log_level);

    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    crossterm::terminal::disable_raw_mode()?;

    result.map_err(Into::into)
}

fn event_loop<T: Transport, S: Storage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    s: &mut State<T, S>,
    pad_rx: &Receiver<RawEvent>,
    listener: &mut PadListener,
) -> io::Result<()> {
    let mut last_poll = Instant::now();
    loop {
        while let Ok(ev) = pad_rx.try_recv() {
            s.handle_pad(ev);
        }
        if last_poll.elapsed() >= DEVICE_POLL {
            listener.poll_new_devices();
            s.pad_inputs = listener.connection_count();
            last_poll = Instant::now();
        }

        render(terminal, s)?;
        if s.quit {
            break;
        }

        // Wake up regularly so pad hits show without user input.
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        process_event(s, event::read()?);
        while event::poll(Duration::ZERO)? {
            process_event(s, event::read()?);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Event processing
// ---------------------------------------------------------------------------

fn process_event<T: Transport, S: Storage>(s: &mut State<T, S>, ev: Event) {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if s.popup.is_some() {
                handle_popup_key(s, key.code);
            } else {
                handle_key(s, key.code, key.modifiers);
            }
        }
        Event::Mouse(mouse) => {
            if s.popup.is_some() {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    handle_popup_click(s, mouse.column, mouse.row);
                }
                return;
            }
            handle_mouse(s, mouse.kind, mouse.column, mouse.row);
        }
        _ => {}
    }
}

fn handle_popup_key<T: Transport, S: Storage>(s: &mut State<T, S>, code: KeyCode) {
    let Some(popup) = s.popup.take() else {
        return;
    };
    match popup {
        Popup::Map(mut list) => match code {
            KeyCode::Esc => {}
            KeyCode::Enter => s.remap_focused(list.selected),
            KeyCode::Up | KeyCode::Char('k') => {
                list.up();
                s.popup = Some(Popup::Map(list));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                list.down();
                s.popup = Some(Popup::Map(list));
            }
            KeyCode::Char(c @ '1'..='6') => s.remap_focused(c as usize - '1' as usize),
            _ => s.popup = Some(Popup::Map(list)),
        },
        Popup::SaveName(mut input) => match code {
            KeyCode::Esc => {}
            KeyCode::Enter => s.save_preset(&input.value),
            code => {
                match code {
                    KeyCode::Char(c) => input.insert(c),
                    KeyCode::Backspace => input.backspace(),
                    KeyCode::Delete => input.delete(),
                    KeyCode::Left => input.left(),
                    KeyCode::Right => input.right(),
                    KeyCode::Home => input.home(),
                    KeyCode::End => input.end(),
                    _ => {}
                }
                s.popup = Some(Popup::SaveName(input));
            }
        },
        Popup::ConfirmDelete(name) => {
            if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                s.delete_preset(&name);
            }
        }
    }
}

fn handle_popup_click<T: Transport, S: Storage>(s: &mut State<T, S>, x: u16, y: u16) {
    let inner = s.areas.popup_inner;
    if let Some(Popup::Map(list)) = s.popup.as_mut()
        && inner.contains((x, y).into())
    {
        if let Some(slot) = list.click_at(y, inner) {
            s.popup = None;
            s.remap_focused(slot);
        }
        return;
    }
    // Click anywhere else cancels.
    s.popup = None;
}

fn handle_key<T: Transport, S: Storage>(s: &mut State<T, S>, code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if matches!(code, KeyCode::Char('c') | KeyCode::Char('q')) {
            s.quit = true;
        }
        return;
    }

    match code {
        KeyCode::Char('q') => s.quit = true,
        KeyCode::Char('1') => s.active_tab = TAB_CONTROL,
        KeyCode::Char('2') => s.active_tab = TAB_PRESETS,
        KeyCode::Char('3') => s.active_tab = TAB_HELP,
        KeyCode::Tab => s.active_tab = (s.active_tab + 1) % TAB_NAMES.len(),
        KeyCode::BackTab => s.active_tab = (s.active_tab + TAB_NAMES.len() - 1) % TAB_NAMES.len(),
        KeyCode::Char('[') => s.cycle_bus(false),
        KeyCode::Char(']') => s.cycle_bus(true),
        KeyCode::F(n @ 1..=5) => s.select_bus(n as usize - 1),
        code => match s.active_tab {
            TAB_CONTROL => handle_control_key(s, code),
            TAB_PRESETS => handle_presets_key(s, code),
            _ => handle_help_key(s, code),
        },
    }
}

fn handle_control_key<T: Transport, S: Storage>(s: &mut State<T, S>, code: KeyCode) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => s.effect_state.up(),
        KeyCode::Down | KeyCode::Char('j') => s.effect_state.down(),
        KeyCode::Home => s.effect_state.select(0),
        KeyCode::End => s.effect_state.select(s.effect_state.len.saturating_sub(1)),
        KeyCode::Enter => s.apply_effect(s.effect_state.selected),
        KeyCode::Left | KeyCode::Char('h') => s.focused_knob = s.focused_knob.saturating_sub(1),
        KeyCode::Right | KeyCode::Char('l') => s.focused_knob = (s.focused_knob + 1).min(KNOB_COUNT - 1),
        KeyCode::Char('+') | KeyCode::Char('=') => s.nudge_knob(FINE_STEP),
        KeyCode::Char('-') | KeyCode::Char('_') => s.nudge_knob(-FINE_STEP),
        KeyCode::PageUp => s.nudge_knob(COARSE_STEP),
        KeyCode::PageDown => s.nudge_knob(-COARSE_STEP),
        KeyCode::Char('m') => s.open_map(),
        _ => {}
    }
}

fn handle_presets_key<T: Transport, S: Storage>(s: &mut State<T, S>, code: KeyCode) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => s.preset_state.up(),
        KeyCode::Down | KeyCode::Char('j') => s.preset_state.down(),
        KeyCode::Enter | KeyCode::Char('l') => s.load_selected_preset(),
        KeyCode::Char('s') => s.popup = Some(Popup::SaveName(TextInputState::new(NAME_LIMIT))),
        KeyCode::Char('d') => {
            if let Some(name) = s.selected_preset() {
                s.popup = Some(Popup::ConfirmDelete(name));
            }
        }
        _ => {}
    }
}

fn handle_help_key<T: Transport, S: Storage>(s: &mut State<T, S>, code: KeyCode) {
    let page = s.areas.help.height.max(1) as usize;
    match code {
        KeyCode::Up | KeyCode::Char('k') => s.help_offset = s.help_offset.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => s.help_offset += 1,
        KeyCode::PageUp => s.help_offset = s.help_offset.saturating_sub(page),
        KeyCode::PageDown => s.help_offset += page,
        _ => return,
    }
    s.help_offset = ScrollView::clamp_offset(s.help_offset, s.help_lines.len(), page);
}

fn handle_mouse<T: Transport, S: Storage>(s: &mut State<T, S>, kind: MouseEventKind, x: u16, y: u16) {
    match kind {
        MouseEventKind::Down(MouseButton::Left) => {
            s.knob_dragging = None;
            s.xy_dragging = false;
            s.help_scrollbar_dragging = false;

            if let Some(tab) = TabBar::new(TAB_NAMES, s.active_tab).tab_at(x, y, s.areas.tab) {
                s.active_tab = tab;
                return;
            }
            if let Some(bus) = TabBar::new(catalog::bus_labels(), s.bus()).tab_at(x, y, s.areas.bus_bar) {
                s.select_bus(bus);
                return;
            }
            if let Some(key) = action_bar_hit(x, y, s.areas.action_bar, actions_for(s.active_tab)) {
                handle_key(s, KeyCode::Char(key), KeyModifiers::NONE);
                return;
            }

            let pos = Position::new(x, y);
            match s.active_tab {
                TAB_CONTROL => {
                    if s.areas.effects_inner.contains(pos) {
                        if let Some(index) = s.effect_state.click_at(y, s.areas.effects_inner) {
                            s.apply_effect(index);
                        }
                    } else if s.areas.knobs_inner.contains(pos) {
                        if let Some(knob) = KnobBank::knob_at(x, y, s.areas.knobs_inner, KNOB_COUNT) {
                            s.focused_knob = knob;
                            s.knob_dragging = Some(knob);
                            if let Some(value) = KnobBank::value_at(y, s.areas.knobs_inner) {
                                s.set_knob(knob, value);
                            }
                        }
                    } else if s.areas.xy_inner.contains(pos) {
                        s.xy_dragging = true;
                        s.drag_xy(x, y);
                    }
                }
                TAB_PRESETS => {
                    s.preset_state.click_at(y, s.areas.presets_inner);
                }
                _ => {
                    let total = s.help_lines.len();
                    if ScrollView::is_scrollbar_hit(x, s.areas.help, total) {
                        s.help_offset = ScrollView::offset_from_scrollbar(y, s.areas.help, total);
                        s.help_scrollbar_dragging = true;
                    }
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some(knob) = s.knob_dragging {
                if let Some(value) = KnobBank::value_at(y, s.areas.knobs_inner) {
                    s.set_knob(knob, value);
                }
            } else if s.xy_dragging {
                s.drag_xy(x, y);
            } else if s.help_scrollbar_dragging {
                let total = s.help_lines.len();
                s.help_offset = ScrollView::offset_from_scrollbar(y, s.areas.help, total);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            s.knob_dragging = None;
            s.xy_dragging = false;
            s.help_scrollbar_dragging = false;
        }
        MouseEventKind::ScrollUp => scroll(s, -3),
        MouseEventKind::ScrollDown => scroll(s, 3),
        _ => {}
    }
}

fn scroll<T: Transport, S: Storage>(s: &mut State<T, S>, delta: isize) {
    match s.active_tab {
        TAB_CONTROL => {
            let height = s.areas.effects_inner.height as usize;
            s.effect_state.scroll(delta, height);
        }
        TAB_PRESETS => {
            let height = s.areas.presets_inner.height as usize;
            s.preset_state.scroll(delta, height);
        }
        _ => {
            let page = s.areas.help.height as usize;
            let offset = s.help_offset.saturating_add_signed(delta);
            s.help_offset = ScrollView::clamp_offset(offset, s.help_lines.len(), page);
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render<T: Transport, S: Storage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    s: &mut State<T, S>,
) -> io::Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        let [tab_area, bus_area, content_area, status_area, action_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        s.areas.tab = tab_area;
        s.areas.bus_bar = bus_area;
        s.areas.action_bar = action_area;

        let port_style = if s.port_label == "OFFLINE" {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        frame.render_widget(
            TabBar::new(TAB_NAMES, s.active_tab).status(&s.port_label, port_style),
            tab_area,
        );
        frame.render_widget(
            TabBar::new(catalog::bus_labels(), s.bus())
                .separator("  ")
                .active_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            bus_area,
        );

        match s.active_tab {
            TAB_CONTROL => render_control(frame, content_area, s),
            TAB_PRESETS => render_presets(frame, content_area, s),
            _ => {
                s.areas.help = content_area;
                render_help(frame, content_area, &s.help_lines, s.help_offset);
            }
        }

        if let Some(text) = &s.status {
            frame.render_widget(
                Paragraph::new(text.as_str()).style(Style::default().fg(Color::Yellow)),
                status_area,
            );
        }
        render_action_bar(frame, action_area, actions_for(s.active_tab));

        match &s.popup {
            Some(Popup::Map(list)) => {
                s.areas.popup_inner = render_map_popup(frame, area, &s.controller, s.focused_knob, list);
            }
            Some(Popup::SaveName(input)) => render_save_popup(frame, area, input),
            Some(Popup::ConfirmDelete(name)) => render_confirm_popup(frame, area, name),
            None => {}
        }
    })?;
    Ok(())
}

fn render_control<T: Transport, S: Storage>(frame: &mut ratatui::Frame, area: Rect, s: &mut State<T, S>) {
    let bus = s.bus();
    let [effects_area, right] =
        Layout::horizontal([Constraint::Length(26), Constraint::Fill(1)]).areas(area);
    let [knobs_area, bottom] =
        Layout::vertical([Constraint::Length(10), Constraint::Fill(1)]).areas(right);
    let [xy_area, pads_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(26)]).areas(bottom);

    // Effect list.
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} effects ", catalog::bus_label(bus)));
    let effects_inner = block.inner(effects_area);
    frame.render_widget(block, effects_area);
    s.effect_state.ensure_visible(effects_inner.height as usize);
    s.areas.effects_inner = effects_inner;

    let effects = catalog::effects_for(bus);
    let counts: Vec<String> = effects
        .iter()
        .map(|name| match catalog::parameters_for(name).len() {
            0 => String::new(),
            n => n.to_string(),
        })
        .collect();
    let rows: Vec<Row> = effects
        .iter()
        .zip(&counts)
        .map(|(name, count)| Row::new(name).detail(count))
        .collect();
    let active = s.controller.bus(bus).ok().map(|b| b.effect_index);
    frame.render_widget(List::new(&rows, &s.effect_state).marked(active), effects_inner);

    // Knobs.
    let effect = s.controller.effect_name(bus).unwrap_or(catalog::INERT_LABEL);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {effect} "));
    let knobs_inner = block.inner(knobs_area);
    frame.render_widget(block, knobs_area);
    s.areas.knobs_inner = knobs_inner;

    let knobs: Vec<Knob> = (0..KNOB_COUNT)
        .map(|k| Knob {
            label: s.controller.label_for(bus, k),
            value: s.knob_value(k),
        })
        .collect();
    frame.render_widget(KnobBank::new(&knobs, Some(s.focused_knob)), knobs_inner);

    // X/Y pad.
    let (x_label, y_label) = s.controller.xy_labels(bus);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if s.xy_dragging {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        })
        .title(" X/Y ");
    let xy_inner = block.inner(xy_area);
    frame.render_widget(block, xy_area);
    s.areas.xy_inner = xy_inner;
    frame.render_widget(
        XyPad::new(s.knob_value(0), s.knob_value(1), s.invert_y)
            .labels(x_label, y_label)
            .active(s.xy_dragging),
        xy_inner,
    );

    // Pads.
    let title = if s.pad_inputs == 0 {
        " Pads (no input) ".to_string()
    } else {
        match s.last_pad {
            Some(cell) => format!(" Pads: {} ", cell.number()),
            None => " Pads ".to_string(),
        }
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let pads_inner = block.inner(pads_area);
    frame.render_widget(block, pads_area);
    frame.render_widget(PadGrid::new(s.last_pad.map(|c| (c.col, c.row))), pads_inner);
}

fn render_presets<T: Transport, S: Storage>(frame: &mut ratatui::Frame, area: Rect, s: &mut State<T, S>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Presets: {} ", s.store_label));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    s.preset_state.ensure_visible(inner.height as usize);
    s.areas.presets_inner = inner;

    if s.store.is_empty() {
        frame.render_widget(
            Paragraph::new("No presets. Press s to save the current surface.")
                .style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }
    let rows: Vec<Row> = s
        .store
        .iter()
        .map(|(name, preset)| Row::new(name).detail(&preset.description))
        .collect();
    frame.render_widget(List::new(&rows, &s.preset_state), inner);
}

fn render_action_bar(frame: &mut ratatui::Frame, area: Rect, actions: &[(&str, &str)]) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let key_style = Style::default()
        .fg(Color::Black)
        .bg(Color::White)
        .add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(Color::White);

    let y = area.y;
    let mut x = area.x;
    let buf = frame.buffer_mut();
    for &(key, desc) in actions {
        if x > area.x {
            x += 1;
        }
        for (text, style) in [(format!(" {key} "), key_style), (format!(" {desc}"), label_style)] {
            for ch in text.chars() {
                if x >= area.right() {
                    return;
                }
                if let Some(c) = buf.cell_mut((x, y)) {
                    c.set_char(ch);
                    c.set_style(style);
                }
                x += 1;
            }
        }
    }
}

fn render_map_popup<T: Transport>(
    frame: &mut ratatui::Frame,
    area: Rect,
    controller: &Controller<T>,
    knob: usize,
    list: &ListState,
) -> Rect {
    let popup = centered_rect(36, KNOB_COUNT as u16 + 2, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" Knob {} controls ", knob + 1));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let bus = controller.selected_bus();
    let params = controller.parameters(bus);
    let details: Vec<String> = (0..KNOB_COUNT)
        .map(|slot| format!("CC {}", catalog::cc_for(params, slot)))
        .collect();
    let rows: Vec<Row> = details
        .iter()
        .enumerate()
        .map(|(slot, cc)| {
            let name = params.get(slot).map_or(catalog::INERT_LABEL, |p| p.name);
            Row::new(name).detail(cc)
        })
        .collect();
    let current = controller.bus(bus).ok().map(|b| b.slot_for(knob));
    frame.render_widget(List::new(&rows, list).marked(current), inner);
    inner
}

fn render_save_popup(frame: &mut ratatui::Frame, area: Rect, input: &TextInputState) {
    let popup = centered_rect(44, 4, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Save Preset ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    if inner.height >= 2 {
        frame.render_widget(
            Paragraph::new("Enter saves, Esc cancels").style(Style::default().fg(Color::DarkGray)),
            Rect::new(inner.x, inner.y, inner.width, 1),
        );
        frame.render_widget(
            TextInput::new(input).placeholder("preset name"),
            Rect::new(inner.x, inner.y + 1, inner.width, 1),
        );
    }
}

fn render_confirm_popup(frame: &mut ratatui::Frame, area: Rect, name: &str) {
    let popup = centered_rect(44, 3, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Delete Preset ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    frame.render_widget(Paragraph::new(format!("Delete \"{name}\"? (y/n)")), inner);
}

fn render_help(frame: &mut ratatui::Frame, area: Rect, lines: &[String], offset: usize) {
    let styled: Vec<Line> = lines
        .iter()
        .map(|l| {
            if l.is_empty() || l.starts_with("  ") {
                Line::raw(l.as_str())
            } else {
                Line::styled(
                    l.as_str(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )
            }
        })
        .collect();
    let clamped = ScrollView::clamp_offset(offset, styled.len(), area.height as usize);
    frame.render_widget(ScrollView::new(&styled, clamped), area);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn actions_for(tab: usize) -> &'static [(&'static str, &'static str)] {
    match tab {
        TAB_CONTROL => &[("m", "map knob"), ("[", "prev bus"), ("]", "next bus"), ("q", "quit")],
        TAB_PRESETS => &[("l", "load"), ("s", "save"), ("d", "delete"), ("q", "quit")],
        _ => &[("q", "quit")],
    }
}

fn action_bar_hit(x: u16, y: u16, area: Rect, actions: &[(&str, &str)]) -> Option<char> {
    if y != area.y || x < area.x || x >= area.right() {
        return None;
    }
    let rel_x = (x - area.x) as usize;
    let mut pos = 0;
    for &(key, desc) in actions {
        if pos > 0 {
            pos += 1;
        }
        let width = key.chars().count() + 2 + desc.chars().count() + 1;
        if rel_x >= pos && rel_x < pos + width {
            return key.chars().next();
        }
        pos += width;
    }
    None
}

fn build_help_lines() -> Vec<String> {
    vec![
        "sp404ctl: SP-404MKII effect control surface".into(),
        "".into(),
        "Global keybindings:".into(),
        "  1 2 3      Switch to tab by number".into(),
        "  Tab        Next tab".into(),
        "  Shift+Tab  Previous tab".into(),
        "  [ ]        Previous / next bus".into(),
        "  F1-F5      Select BUS 1-4 or INPUT".into(),
        "  q, Ctrl+Q  Quit".into(),
        "".into(),
        "Control tab:".into(),
        "  Up/Down    Move in the effect list".into(),
        "  Enter      Load the effect on the bus".into(),
        "  Left/Right Focus a knob".into(),
        "  + / -      Turn the focused knob by 1".into(),
        "  PgUp/PgDn  Turn the focused knob by 8".into(),
        "  m          Choose the parameter behind the focused knob".into(),
        "".into(),
        "  Loading an effect resets every knob to its own parameter.".into(),
        "  The X/Y pad drives knobs 1 and 2.".into(),
        "".into(),
        "Presets tab:".into(),
        "  Up/Down    Select preset".into(),
        "  Enter, l   Load and send to the device".into(),
        "  s          Save the surface under a name".into(),
        "  d          Delete (asks y/n)".into(),
        "".into(),
        "Mouse:".into(),
        "  Click      Tabs, buses, effects, presets, actions".into(),
        "  Drag       Knob faders and the X/Y pad".into(),
        "  Scroll     Lists and this page".into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::CcMessage;
    use crate::preset::MemoryStorage;

    fn state() -> State<Vec<CcMessage>, MemoryStorage> {
        let store = PresetStore::open(MemoryStorage::default()).unwrap();
        State::new(Controller::new(Vec::new()), store, true)
    }

    fn sent(s: &State<Vec<CcMessage>, MemoryStorage>) -> Vec<[u8; 3]> {
        s.controller.transport().iter().map(|m| m.to_bytes()).collect()
    }

    fn press(s: &mut State<Vec<CcMessage>, MemoryStorage>, code: KeyCode) {
        process_event(
            s,
            Event::Key(crossterm::event::KeyEvent::new(code, KeyModifiers::NONE)),
        );
    }

    fn type_str(s: &mut State<Vec<CcMessage>, MemoryStorage>, text: &str) {
        for ch in text.chars() {
            press(s, KeyCode::Char(ch));
        }
    }

    #[test]
    fn enter_loads_effect_under_cursor() {
        let mut s = state();
        assert_eq!(s.effect_state.selected, 1);
        press(&mut s, KeyCode::Down);
        press(&mut s, KeyCode::Enter);
        assert_eq!(sent(&s), vec![[0xB0, 83, 2]]);
        assert_eq!(s.controller.bus(0).unwrap().effect_index, 2);
    }

    #[test]
    fn bus_keys_follow_the_selected_bus() {
        let mut s = state();
        press(&mut s, KeyCode::Char('['));
        assert_eq!(s.bus(), 4);
        assert_eq!(s.effect_state.len, catalog::effects_for(4).len());
        press(&mut s, KeyCode::F(2));
        assert_eq!(s.bus(), 1);
        press(&mut s, KeyCode::Char('+'));
        assert_eq!(sent(&s), vec![[0xB1, catalog::CTRL_CCS[0], 64]]);
    }

    #[test]
    fn knob_nudges_clamp() {
        let mut s = state();
        for _ in 0..10 {
            press(&mut s, KeyCode::PageUp);
        }
        assert_eq!(s.knob_value(0), 127);
        assert_eq!(sent(&s).last().map(|b| b[2]), Some(127));
    }

    #[test]
    fn map_popup_remaps_focused_knob_without_sending() {
        let mut s = state();
        press(&mut s, KeyCode::Right);
        press(&mut s, KeyCode::Char('m'));
        assert!(matches!(s.popup, Some(Popup::Map(_))));
        press(&mut s, KeyCode::Char('4'));
        assert!(s.popup.is_none());
        assert_eq!(s.controller.bus(0).unwrap().slot_for(1), 3);
        assert!(sent(&s).is_empty());
    }

    #[test]
    fn xy_drag_coalesces_repeats() {
        let mut s = state();
        s.areas.xy_inner = Rect::new(0, 0, 33, 17);
        s.drag_xy(32, 0);
        s.drag_xy(32, 0);
        assert_eq!(sent(&s).len(), 2);
        assert_eq!(s.knob_value(0), 127);
        assert_eq!(s.knob_value(1), 127);
        s.drag_xy(0, 16);
        assert_eq!(sent(&s).len(), 4);
        assert_eq!(s.knob_value(1), 0);
    }

    #[test]
    fn save_prompt_rejects_blank_names() {
        let mut s = state();
        press(&mut s, KeyCode::Char('2'));
        press(&mut s, KeyCode::Char('s'));
        type_str(&mut s, "   ");
        press(&mut s, KeyCode::Enter);
        assert!(s.store.is_empty());
        assert!(s.status.as_deref().is_some_and(|m| m.contains("name")));
    }

    #[test]
    fn save_then_delete_with_confirmation() {
        let mut s = state();
        press(&mut s, KeyCode::Char('2'));
        press(&mut s, KeyCode::Char('s'));
        type_str(&mut s, "Set 1");
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.store.names().collect::<Vec<_>>(), vec!["Set 1"]);

        press(&mut s, KeyCode::Char('d'));
        press(&mut s, KeyCode::Char('n'));
        assert_eq!(s.store.len(), 1);

        press(&mut s, KeyCode::Char('d'));
        press(&mut s, KeyCode::Char('y'));
        assert!(s.store.is_empty());
    }

    #[test]
    fn loading_preset_replays_and_resyncs_list() {
        let mut s = state();
        s.controller.select_effect(0, 5).unwrap();
        s.save_preset("five");
        s.controller.select_effect(0, 2).unwrap();
        let before = sent(&s).len();

        press(&mut s, KeyCode::Char('2'));
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.controller.bus(0).unwrap().effect_index, 5);
        assert_eq!(s.effect_state.selected, 5);
        assert_eq!(sent(&s).len() - before, catalog::BUS_COUNT * 7);
    }

    #[test]
    fn pad_hits_light_the_grid() {
        let mut s = state();
        s.handle_pad([0x90, 41, 100]);
        assert_eq!(s.last_pad, Some(PadCell { col: 1, row: 1 }));
        s.handle_pad([0x80, 36, 0]);
        assert_eq!(s.last_pad.map(PadCell::number), Some(6));
    }

    #[test]
    fn action_bar_hit_maps_columns_to_keys() {
        let area = Rect::new(0, 20, 80, 1);
        let actions = actions_for(TAB_PRESETS);
        // " l " + " load" = 8 columns, then a gap.
        assert_eq!(action_bar_hit(0, 20, area, actions), Some('l'));
        assert_eq!(action_bar_hit(7, 20, area, actions), Some('l'));
        assert_eq!(action_bar_hit(9, 20, area, actions), Some('s'));
        assert_eq!(action_bar_hit(0, 19, area, actions), None);
    }
}
