use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use storefront_api::HttpShopApi;
use storefront_app_shell::{StorefrontFrame, StorefrontOptions, StorefrontShell};
use storefront_runtime_std::FileStorage;

const ENV_STORAGE: &str = "STOREFRONT_STORAGE";
const ENV_ORDER_PHONE: &str = "STOREFRONT_ORDER_PHONE";
const DEFAULT_STORAGE_FILE: &str = "storefront-storage.json";

const IDLE_WAIT: Duration = Duration::from_millis(250);
const STEP_TIMEOUT: Duration = Duration::from_secs(15);

/// Drives the shell until a rendered frame satisfies `done`.
fn run_until(
    shell: &StorefrontShell,
    wake: &Receiver<()>,
    done: impl Fn(&StorefrontFrame) -> bool,
) -> Option<StorefrontFrame> {
    let started = Instant::now();
    loop {
        shell.update();
        if shell.should_render() {
            match shell.render() {
                Ok(frame) if done(&frame) => return Some(frame),
                Ok(_) => {}
                Err(err) => {
                    log::error!("render failed: {err}");
                    return None;
                }
            }
        }
        if started.elapsed() >= STEP_TIMEOUT {
            log::warn!("gave up waiting after {STEP_TIMEOUT:?}");
            return None;
        }
        let now = shell.runtime().elapsed_millis();
        let wait = shell
            .next_deadline_millis()
            .map(|due| Duration::from_millis(due.saturating_sub(now)))
            .map_or(IDLE_WAIT, |until_timer| until_timer.min(IDLE_WAIT));
        let _ = wake.recv_timeout(wait);
    }
}

fn print_frame(title: &str, frame: &StorefrontFrame) {
    println!("=== {title} ===");
    print!("{frame}");
    println!();
}

fn main() {
    env_logger::init();

    let options = StorefrontOptions::from_env();
    let storage_path =
        std::env::var(ENV_STORAGE).unwrap_or_else(|_| DEFAULT_STORAGE_FILE.to_owned());

    let tokio = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("cannot start the I/O runtime: {err}");
            std::process::exit(1);
        }
    };
    let _io = tokio.enter();

    println!("=== Storefront demo ===");
    println!("API: {}", options.api_base);
    println!("Storage: {storage_path}");
    println!();

    let api = Rc::new(HttpShopApi::new(options.api_base.clone()));
    let storage = Rc::new(FileStorage::open(&storage_path));
    let shell = StorefrontShell::mount(options, api, storage);

    let (wake_tx, wake_rx) = mpsc::sync_channel::<()>(1);
    shell.set_frame_waker(move || {
        let _ = wake_tx.try_send(());
    });

    let Some(frame) = run_until(&shell, &wake_rx, |frame| {
        !frame.catalog.loading && !frame.reviews.loading
    }) else {
        return;
    };
    print_frame("first page", &frame);

    if let Some(first) = frame.catalog.cards.first().map(|card| card.id) {
        shell.buy(first);
        shell.increment(first);
        if let Some(frame) = run_until(&shell, &wake_rx, |_| true) {
            print_frame("after buying", &frame);
        }
    }

    if frame.catalog.has_more && shell.sentinel_visibility(true) {
        if let Some(frame) = run_until(&shell, &wake_rx, |frame| !frame.catalog.loading) {
            print_frame("after scrolling", &frame);
        }
        shell.sentinel_visibility(false);
    }

    if let Ok(phone) = std::env::var(ENV_ORDER_PHONE) {
        shell.phone_input(&phone);
        if shell.submit_order() {
            if let Some(frame) = run_until(&shell, &wake_rx, |frame| !frame.checkout.loading) {
                print_frame("after ordering", &frame);
            }
        } else if let Ok(frame) = shell.render() {
            print_frame("order not sent", &frame);
        }
    }

    shell.unmount();
}
