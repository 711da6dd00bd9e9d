//! Display controller
//!
//! [`Display`] owns the framebuffer, the loaded font and the transport
//! behind one async mutex. Drawing calls lock, rasterize into the buffer,
//! mark it dirty and return without touching the bus. [`Display::run_refresh`]
//! wakes every refresh period and, when the buffer is dirty, sends the whole
//! buffer as one data frame while still holding the lock, so the panel never
//! receives a half-drawn frame.
//!
//! Lifecycle:
//!
//! 1. [`Display::init`] probes the bus and sends the bring-up sequence
//! 2. `run_refresh()` runs alongside the application (join, spawn, ...)
//! 3. [`Display::stop`] makes `run_refresh()` return
//! 4. [`Display::into_parts`] hands back the transport and the buffer

use alloc::vec::Vec;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use lumen_core::{raster, text, FontTable, Geometry, Op, PixelBuffer, Sectors};

use crate::command::{self, cmd, ScrollDirection, ScrollSpeed};
use crate::config::DisplayConfig;
use crate::error::Error;
use crate::transport::Transport;

/// Transfer failures kept for the application; newer ones are dropped
pub const FAULT_QUEUE_DEPTH: usize = 4;

/// State guarded by the controller lock
struct State<T> {
    buffer: PixelBuffer,
    dirty: bool,
    font: Option<FontTable>,
    transport: T,
}

/// SSD1306 controller
///
/// `M` selects the lock flavour (`CriticalSectionRawMutex` on firmware,
/// `NoopRawMutex` when everything runs on one executor).
pub struct Display<M: RawMutex, T: Transport> {
    state: Mutex<M, State<T>>,
    stop: Signal<M, ()>,
    faults: Channel<M, T::Error, FAULT_QUEUE_DEPTH>,
    refresh_period: Duration,
    address: u8,
    geometry: Geometry,
}

impl<M: RawMutex, T: Transport> Display<M, T> {
    /// Validate `config`, probe for the panel and bring it up
    ///
    /// Fails with [`Error::DeviceNotFound`] and sends nothing when the panel
    /// does not answer, or when `transport` targets a different address
    /// than `config.address`.
    pub async fn init(mut transport: T, config: &DisplayConfig) -> Result<Self, Error<T::Error>> {
        let geometry = config.validate()?;

        // The transport decides where frames go; it must be the configured panel
        if transport.address() != config.address
            || !transport.probe().await.map_err(Error::Transfer)?
        {
            #[cfg(feature = "defmt")]
            defmt::warn!("No display at {=u8:#x}", config.address);
            return Err(Error::DeviceNotFound(config.address));
        }

        transport
            .send_commands(&command::init_sequence(config, geometry))
            .await
            .map_err(Error::Transfer)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "SSD1306 {}x{} at {=u8:#x} initialized",
            geometry.width(),
            geometry.height(),
            config.address
        );

        Ok(Self {
            state: Mutex::new(State {
                buffer: PixelBuffer::new(geometry),
                // First refresh pushes the blank buffer
                dirty: true,
                font: None,
                transport,
            }),
            stop: Signal::new(),
            faults: Channel::new(),
            refresh_period: config.refresh_period(),
            address: config.address,
            geometry,
        })
    }

    /// Panel geometry
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Panel bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Period of the refresh task
    pub fn refresh_period(&self) -> Duration {
        self.refresh_period
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Run `f` on the buffer under the lock and mark it dirty
    async fn draw<R>(&self, f: impl FnOnce(&mut PixelBuffer) -> R) -> R {
        let mut state = self.state.lock().await;
        let result = f(&mut state.buffer);
        state.dirty = true;
        result
    }

    /// Turn every pixel off
    pub async fn clear(&self) {
        self.draw(|buf| buf.clear()).await
    }

    /// Apply `op` to one pixel (coordinates clamped)
    pub async fn put_pixel(&self, x: i32, y: i32, op: Op) {
        self.draw(|buf| buf.set_pixel(x, y, op)).await
    }

    pub async fn draw_line(&self, x0: i32, y0: i32, x1: i32, y1: i32, op: Op) {
        self.draw(|buf| raster::line(buf, x0, y0, x1, y1, op)).await
    }

    /// Rectangle border between two inclusive corners
    pub async fn draw_rectangle(&self, x0: i32, y0: i32, x1: i32, y1: i32, op: Op) {
        self.draw(|buf| raster::rectangle_outline(buf, x0, y0, x1, y1, op))
            .await
    }

    pub async fn fill_rectangle(&self, x0: i32, y0: i32, x1: i32, y1: i32, op: Op) {
        self.draw(|buf| raster::fill_rectangle(buf, x0, y0, x1, y1, op))
            .await
    }

    /// Circle outline; the radius shrinks to fit on the panel
    pub async fn draw_circle(&self, x0: i32, y0: i32, r: i32, op: Op) {
        self.draw(|buf| raster::circle_outline(buf, x0, y0, r, op))
            .await
    }

    pub async fn fill_circle(&self, x0: i32, y0: i32, r: i32, op: Op) {
        self.draw(|buf| raster::fill_circle(buf, x0, y0, r, op)).await
    }

    /// Octants of a circle selected by `sectors`
    pub async fn draw_arc(&self, x0: i32, y0: i32, r: i32, sectors: Sectors, op: Op) {
        self.draw(|buf| raster::arc(buf, x0, y0, r, sectors, op))
            .await
    }

    pub async fn draw_rounded_rect(&self, x0: i32, y0: i32, x1: i32, y1: i32, r: i32, op: Op) {
        self.draw(|buf| raster::rounded_rect_outline(buf, x0, y0, x1, y1, r, op))
            .await
    }

    pub async fn fill_rounded_rect(&self, x0: i32, y0: i32, x1: i32, y1: i32, r: i32, op: Op) {
        self.draw(|buf| raster::rounded_rect_fill(buf, x0, y0, x1, y1, r, op))
            .await
    }

    /// Draw one character, returning the x just past it
    pub async fn put_char(&self, ch: char, x: i32, y: i32, op: Op) -> Result<i32, Error<T::Error>> {
        let mut state = self.state.lock().await;
        let State {
            buffer,
            dirty,
            font,
            ..
        } = &mut *state;
        let font = font.as_ref().ok_or(Error::NoFont)?;
        let end = text::draw_glyph(buffer, font, ch, x, y, op)?;
        *dirty = true;
        Ok(end)
    }

    /// Draw a string on one line, truncated at the right edge
    ///
    /// On a missing glyph the characters before it stay drawn.
    pub async fn put_string(
        &self,
        s: &str,
        x: i32,
        y: i32,
        op: Op,
    ) -> Result<i32, Error<T::Error>> {
        let mut state = self.state.lock().await;
        let State {
            buffer,
            dirty,
            font,
            ..
        } = &mut *state;
        let font = font.as_ref().ok_or(Error::NoFont)?;
        *dirty = true;
        Ok(text::draw_string(buffer, font, s, x, y, op)?)
    }

    // ========================================================================
    // Fonts
    // ========================================================================

    /// Replace the current font
    pub async fn set_font(&self, font: FontTable) {
        self.state.lock().await.font = Some(font);
    }

    /// Parse a JSON font description and make it current
    ///
    /// The previous font stays loaded when parsing fails.
    pub async fn load_font(&self, source: &[u8]) -> Result<(), Error<T::Error>> {
        let font = FontTable::from_slice(source)?;
        self.set_font(font).await;
        Ok(())
    }

    pub async fn has_font(&self) -> bool {
        self.state.lock().await.font.is_some()
    }

    // ========================================================================
    // Panel control
    // ========================================================================

    async fn commands(&self, commands: &[u8]) -> Result<(), Error<T::Error>> {
        let mut state = self.state.lock().await;
        state
            .transport
            .send_commands(commands)
            .await
            .map_err(Error::Transfer)
    }

    pub async fn set_contrast(&self, contrast: u8) -> Result<(), Error<T::Error>> {
        self.commands(&[cmd::SET_CONTRAST, contrast]).await
    }

    /// Swap lit and unlit pixels in hardware
    pub async fn set_inverted(&self, inverted: bool) -> Result<(), Error<T::Error>> {
        self.commands(&[command::inversion(inverted)]).await
    }

    /// Switch the panel on or off (display RAM is kept)
    pub async fn set_power(&self, on: bool) -> Result<(), Error<T::Error>> {
        self.commands(&[command::power(on)]).await
    }

    /// Start a hardware horizontal scroll over `start_page..=end_page`
    pub async fn start_scroll(
        &self,
        direction: ScrollDirection,
        start_page: u8,
        end_page: u8,
        speed: ScrollSpeed,
    ) -> Result<(), Error<T::Error>> {
        self.commands(&command::horizontal_scroll(direction, start_page, end_page, speed))
            .await
    }

    /// Stop scrolling
    ///
    /// Display RAM is undefined after a scroll, so the buffer is marked dirty
    /// to be rewritten on the next refresh.
    pub async fn stop_scroll(&self) -> Result<(), Error<T::Error>> {
        let mut state = self.state.lock().await;
        state
            .transport
            .send_command(cmd::DEACTIVATE_SCROLL)
            .await
            .map_err(Error::Transfer)?;
        state.dirty = true;
        Ok(())
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Whether the buffer has changes not yet sent to the panel
    pub async fn is_dirty(&self) -> bool {
        self.state.lock().await.dirty
    }

    pub async fn pixel(&self, x: i32, y: i32) -> bool {
        self.state.lock().await.buffer.pixel(x, y)
    }

    /// Copy of the current buffer bytes
    pub async fn snapshot(&self) -> Vec<u8> {
        self.state.lock().await.buffer.as_bytes().to_vec()
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// One refresh cycle
    ///
    /// Sends the buffer when dirty, after rewinding the panel's write window
    /// to the origin. Returns whether a frame went out; dirty
    /// is only cleared once the transfer succeeded.
    pub async fn refresh(&self) -> Result<bool, T::Error> {
        let mut state = self.state.lock().await;
        if !state.dirty {
            return Ok(false);
        }
        let State {
            buffer,
            dirty,
            transport,
            ..
        } = &mut *state;
        // A failed frame can leave the RAM pointer anywhere
        transport
            .send_commands(&command::address_window(self.geometry))
            .await?;
        transport.send_data(buffer.as_bytes()).await?;
        *dirty = false;
        Ok(true)
    }

    /// Refresh every period until [`stop`](Self::stop) is called
    ///
    /// Failed transfers are queued on [`faults`](Self::faults) and retried on
    /// the next tick.
    pub async fn run_refresh(&self) {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "Display refresh started ({} ms)",
            self.refresh_period.as_millis()
        );

        let mut ticker = Ticker::every(self.refresh_period);

        loop {
            match select(ticker.next(), self.stop.wait()).await {
                Either::First(()) => {
                    if let Err(e) = self.refresh().await {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("Display refresh failed, retrying");
                        // Full queue: the application already knows
                        let _ = self.faults.try_send(e);
                    }
                }
                Either::Second(()) => break,
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Display refresh stopped");
    }

    /// Ask [`run_refresh`](Self::run_refresh) to return
    pub fn stop(&self) {
        self.stop.signal(());
    }

    /// Transfer failures reported by the refresh task
    pub fn faults(&self) -> Receiver<'_, M, T::Error, FAULT_QUEUE_DEPTH> {
        self.faults.receiver()
    }

    /// Tear down, returning the transport and the final buffer
    pub fn into_parts(self) -> (T, PixelBuffer) {
        let state = self.state.into_inner();
        (state.transport, state.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    /// Records every frame, never fails
    #[derive(Default)]
    struct Recorder {
        commands: Vec<u8>,
        frames: usize,
    }

    impl Transport for Recorder {
        type Error = ();

        fn address(&self) -> u8 {
            0x3C
        }

        async fn probe(&mut self) -> Result<bool, ()> {
            Ok(true)
        }

        async fn send_command(&mut self, command: u8) -> Result<(), ()> {
            self.commands.push(command);
            Ok(())
        }

        async fn send_data(&mut self, _data: &[u8]) -> Result<(), ()> {
            self.frames += 1;
            Ok(())
        }
    }

    fn display() -> Display<NoopRawMutex, Recorder> {
        block_on(Display::init(Recorder::default(), &DisplayConfig::default())).unwrap()
    }

    #[test]
    fn test_init_sends_sequence() {
        let (transport, buffer) = display().into_parts();
        assert_eq!(
            transport.commands.as_slice(),
            command::init_sequence(&DisplayConfig::default(), Geometry::SSD1306_128X64).as_slice()
        );
        assert_eq!(transport.frames, 0);
        assert_eq!(buffer.len(), 1024);
    }

    #[test]
    fn test_refresh_only_when_dirty() {
        let d = display();
        block_on(async {
            assert!(d.is_dirty().await);
            assert_eq!(d.refresh().await, Ok(true));
            assert_eq!(d.refresh().await, Ok(false));

            d.put_pixel(1, 1, Op::Set).await;
            assert!(d.is_dirty().await);
            assert_eq!(d.refresh().await, Ok(true));
        });
        let (transport, _) = d.into_parts();
        assert_eq!(transport.frames, 2);
        // Every frame is preceded by the full-panel window
        let window = command::address_window(Geometry::SSD1306_128X64);
        assert!(transport.commands.ends_with(&window));
    }

    #[test]
    fn test_text_without_font() {
        let d = display();
        block_on(async {
            assert_eq!(d.put_char('A', 0, 0, Op::Set).await, Err(Error::NoFont));
            assert_eq!(d.put_string("AB", 0, 0, Op::Set).await, Err(Error::NoFont));
        });
    }

    #[test]
    fn test_stop_scroll_marks_dirty() {
        let d = display();
        block_on(async {
            d.refresh().await.unwrap();
            d.stop_scroll().await.unwrap();
            assert!(d.is_dirty().await);
        });
        let (transport, _) = d.into_parts();
        assert_eq!(transport.commands.last(), Some(&cmd::DEACTIVATE_SCROLL));
    }
}
