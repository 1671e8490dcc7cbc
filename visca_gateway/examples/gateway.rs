use clap::Parser;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use visca_gateway::{
    Controller, Flavor, GatewayConfig, IpCameraConfig, Result, SerialConfig, ServerConfig,
    StateUpdate,
};

/// VISCA gateway: drives a serial camera chain (and optional IP cameras)
/// and serves them over UDP.
#[derive(Debug, Parser)]
#[clap(verbatim_doc_comment)]
struct CliParser {
    /// Serial port of the camera chain, e.g. /dev/ttyUSB0.
    #[clap(short, long)]
    pub port: Option<String>,

    /// Serial baud rate.
    #[clap(short, long, default_value_t = 9600)]
    pub baud: u32,

    /// IP camera as ip:port, exposed at the next free address.
    #[clap(short, long)]
    pub camera: Vec<String>,

    /// Base port for the UDP passthrough server (camera N listens on
    /// base + N).
    #[clap(short, long)]
    pub serve: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .compact()
        .init();
    let opts = CliParser::parse();

    let mut config = GatewayConfig {
        serial: opts.port.map(|port| SerialConfig {
            port,
            baud: opts.baud,
        }),
        ip_cameras: Vec::new(),
        server: opts.serve.map(|base_port| ServerConfig { base_port }),
    };
    for (i, target) in opts.camera.iter().enumerate() {
        let addr: std::net::SocketAddr = target.parse().expect("camera must be ip:port");
        config.ip_cameras.push(IpCameraConfig {
            name: format!("camera-{target}"),
            index: (i + 1) as u8,
            ip: addr.ip(),
            port: addr.port(),
            flavor: Flavor::Ptz,
        });
    }

    let gateway = Controller::start(config).await?;
    let state = gateway.state();
    info!(
        "Gateway running with {} camera(s): {:?}",
        state.cameras.len(),
        state.cameras.keys().collect::<Vec<_>>()
    );

    let mut updates = gateway.state_updates();
    loop {
        let Ok((address, update)) = updates.recv().await else {
            info!("gateway stopped");
            return Ok(());
        };

        if update.contains(StateUpdate::CAMERA_TABLE) {
            let state = gateway.state();
            info!(
                "Camera table: {:?}",
                state.cameras.keys().collect::<Vec<_>>()
            );
        }

        if update.intersects(StateUpdate::STATUS) {
            let state = gateway.state();
            if let Some(status) = state.cameras.get(&address) {
                info!(
                    "Camera {address}: power={} pan={} tilt={} zoom={:#06x} effect={:?}",
                    status.power,
                    status.position.pan,
                    status.position.tilt,
                    status.zoom,
                    status.effect,
                );
            }
        }

        if update.contains(StateUpdate::RUNNING) && !gateway.state().running {
            info!("gateway stopped running");
            return Ok(());
        }
    }
}
