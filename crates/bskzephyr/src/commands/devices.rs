//! Device command handlers.

use tabled::Tabled;

use bskzephyr_api::{ControlRequest, Device, DeviceUser, FanMode, FanSpeed};

use crate::cli::{ControlArgs, DevicesArgs, DevicesCommand, FanModeArg, FanSpeedArg, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::authenticated_client;

// ── Arg conversions ─────────────────────────────────────────────────

impl From<FanModeArg> for FanMode {
    fn from(arg: FanModeArg) -> Self {
        match arg {
            FanModeArg::Cycle => Self::Cycle,
            FanModeArg::Extract => Self::Extract,
            FanModeArg::Supply => Self::Supply,
        }
    }
}

impl From<FanSpeedArg> for FanSpeed {
    fn from(arg: FanSpeedArg) -> Self {
        match arg {
            FanSpeedArg::Night => Self::Night,
            FanSpeedArg::Low => Self::Low,
            FanSpeedArg::Medium => Self::Medium,
            FanSpeedArg::High => Self::High,
        }
    }
}

fn control_request(args: &ControlArgs) -> ControlRequest {
    ControlRequest {
        device_status: args.status.clone(),
        fan_mode: args.mode.map(FanMode::from),
        fan_speed: args.speed.map(FanSpeed::from),
        humidity_boost: args.humidity_boost,
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Temp")]
    temperature: String,
    #[tabled(rename = "Humidity")]
    humidity: String,
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

impl DeviceRow {
    fn new(du: &DeviceUser, color: bool) -> Self {
        let d = &du.device;
        Self {
            group: d.group_id.clone(),
            title: du.title.clone().unwrap_or_default(),
            device: d.device_id.clone(),
            model: d
                .device_model
                .clone()
                .or_else(|| du.device_model.clone())
                .unwrap_or_default(),
            status: output::paint_status(d.device_status.as_deref(), color),
            mode: or_dash(d.fan_mode),
            speed: or_dash(d.fan_speed),
            temperature: d
                .temperature
                .map_or_else(|| "-".into(), |t| format!("{t:.1}°C")),
            humidity: d.humidity.map_or_else(|| "-".into(), |h| format!("{h:.0}%")),
        }
    }
}

fn detail(d: &Device, color: bool) -> String {
    let mut lines = vec![
        format!("Device:    {}", d.device_id),
        format!("Group:     {}", d.group_id),
        format!("Model:     {}", d.device_model.as_deref().unwrap_or("-")),
        format!(
            "Status:    {}",
            output::paint_status(d.device_status.as_deref(), color)
        ),
        format!("Mode:      {}", or_dash(d.fan_mode)),
        format!("Speed:     {}", or_dash(d.fan_speed)),
    ];
    if let Some(boost) = d.humidity_boost {
        let active = if d.humidity_boost_state == Some(true) {
            " (active)"
        } else {
            ""
        };
        lines.push(format!("Boost:     {boost}{active}"));
    }
    if let Some(t) = d.temperature {
        lines.push(format!("Temp:      {t:.1}°C"));
    }
    if let Some(h) = d.humidity {
        lines.push(format!("Humidity:  {h:.0}%"));
    }
    if let Some(f) = d.filter_timer {
        lines.push(format!("Filter:    {f}"));
    }
    if let Some(ref v) = d.version {
        lines.push(format!("Firmware:  {v}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        DevicesCommand::List => {
            let client = authenticated_client(session, global).await?;
            let devices = client
                .list_devices()
                .await
                .map_err(|e| CliError::from_api(e, &session.profile))?;

            let out = output::render_list(
                &global.output,
                &devices,
                |du| DeviceRow::new(du, color),
                |du| du.device.group_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Control(ctl) => {
            let request = control_request(&ctl);
            if request.is_empty() {
                if !global.quiet {
                    eprintln!("Nothing to change: pass --status, --mode, --speed, or --humidity-boost");
                }
                return Ok(());
            }

            let client = authenticated_client(session, global).await?;
            let updated = client
                .control_device(&ctl.group_id, &request)
                .await
                .map_err(|e| CliError::from_api(e, &session.profile))?;

            if let Some(device) = updated {
                let out = output::render_single(
                    &global.output,
                    &device,
                    |d| detail(d, color),
                    |d| d.group_id.clone(),
                )?;
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(status: Option<&str>, boost: Option<i64>) -> ControlArgs {
        ControlArgs {
            group_id: "grp-1".into(),
            status: status.map(str::to_owned),
            mode: None,
            speed: Some(FanSpeedArg::Night),
            humidity_boost: boost,
        }
    }

    #[test]
    fn control_args_map_to_request() {
        let req = control_request(&args(Some("off"), Some(0)));
        assert_eq!(req.device_status.as_deref(), Some("off"));
        assert_eq!(req.fan_speed, Some(FanSpeed::Night));
        assert_eq!(req.humidity_boost, Some(0));
        assert!(!req.is_empty());
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(or_dash::<FanSpeed>(None), "-");
        assert_eq!(or_dash(Some(FanSpeed::High)), "high");
    }
}
