use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use motornode_config::{MapperKind, NodeConfig};
use motornode_proto::Method;
use motornode_pwm::{
    ChannelBank, IdentityMapper, RpmRangeMapper, SpeedMapper, SysfsPwm, MOTOR_COUNT,
};
use motornode_server::{HttpServer, IpcCommandLoop, NodeState, Router};
use tracing::{error, info};

use crate::cmd::ServeArgs;
use crate::exit::{
    config_error, pwm_error, server_error, CliError, CliResult, INTERNAL, SUCCESS,
};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let mut config = NodeConfig::load(&args.config)
        .map_err(|err| config_error("configuration load failed", err))?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(socket) = args.socket {
        config.ipc_socket = socket;
    }

    let channels = init_channels(&config)?;
    let mapper: Box<dyn SpeedMapper> = match config.mapper {
        MapperKind::Identity => Box::new(IdentityMapper),
        MapperKind::RpmRange { min_rpm, max_rpm } => {
            Box::new(RpmRangeMapper::new(min_rpm, max_rpm))
        }
    };
    let state = Arc::new(NodeState::new(ChannelBank::new(channels), mapper));

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(Arc::clone(&running))?;

    let command_loop = IpcCommandLoop::bind(&config.ipc_socket, Arc::clone(&state))
        .map_err(|err| server_error("ipc bind failed", err))?
        .with_running_flag(Arc::clone(&running));
    let ipc_thread = std::thread::Builder::new()
        .name("ipc-command-loop".to_string())
        .spawn(move || {
            if let Err(err) = command_loop.run() {
                error!(%err, "ipc command loop terminated");
            }
        })
        .map_err(|err| CliError::new(INTERNAL, format!("failed to spawn ipc loop: {err}")))?;

    let server = HttpServer::bind(config.http_port)
        .map_err(|err| server_error("http bind failed", err))?
        .with_router(Arc::new(default_router(Arc::clone(&state))))
        .with_workers(config.http_workers)
        .with_running_flag(Arc::clone(&running));

    info!(
        port = config.http_port,
        socket = ?config.ipc_socket,
        "motor controller serving"
    );
    server
        .serve()
        .map_err(|err| server_error("http server failed", err))?;

    running.store(false, Ordering::SeqCst);
    let _ = ipc_thread.join();
    Ok(SUCCESS)
}

fn init_channels(config: &NodeConfig) -> CliResult<[SysfsPwm; MOTOR_COUNT]> {
    let init = |path| {
        SysfsPwm::init(path, config.period_ns)
            .map_err(|err| pwm_error("pwm channel init failed", err))
    };
    let [p0, p1, p2, p3] = &config.motor_paths;
    Ok([init(p0)?, init(p1)?, init(p2)?, init(p3)?])
}

/// The node's endpoint table.
///
/// `/motors` actuates over HTTP through the same per-channel locks as the
/// IPC path; `/duty` reports the current duty cycles as JSON.
fn default_router(state: Arc<NodeState<SysfsPwm>>) -> Router {
    let actuate = Arc::clone(&state);
    Router::new()
        .route("/motors", move |method, body| {
            if method != Method::Post {
                return String::new();
            }
            match parse_speeds(body) {
                Some(speeds) => {
                    actuate.apply_speeds(&speeds);
                    "applied\n".to_string()
                }
                None => String::new(),
            }
        })
        .route("/duty", move |_, _| {
            serde_json::json!({ "duty": state.duty_cycles() }).to_string()
        })
}

/// Parse a `/motors` body: exactly four comma-separated speeds.
fn parse_speeds(body: &str) -> Option<[f32; MOTOR_COUNT]> {
    let mut speeds = [0.0; MOTOR_COUNT];
    let mut parts = body.trim().split(',');
    for slot in &mut speeds {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(speeds)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
