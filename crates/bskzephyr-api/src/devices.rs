// Zephyr cloud device endpoints
//
// Listing the user's device bindings and sending partial control updates.
// Raw fan speed codes are translated through the client's speed table in
// both directions.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::client::{ZephyrClient, from_value};
use crate::error::Error;
use crate::models::{ControlRequest, Device, DeviceUser};

impl ZephyrClient {
    /// List every device the signed-in user can control.
    ///
    /// `GET /device-user`. Order is as returned by the cloud.
    /// A 401 maps to [`Error::InvalidAuth`], other failures to [`Error::Api`].
    pub async fn list_devices(&self) -> Result<Vec<DeviceUser>, Error> {
        let url = self.url("/device-user")?;
        debug!(%url, "listing devices");

        let resp = self
            .authorize(self.http().get(url))?
            .send()
            .await
            .map_err(Error::Transport)?;

        let resp = resp.error_for_status().map_err(|err| {
            if err.status() == Some(StatusCode::UNAUTHORIZED) {
                Error::InvalidAuth {
                    message: Some(err.to_string()),
                    source: Some(err),
                }
            } else {
                api_error(err)
            }
        })?;

        let entries: Vec<Value> = Self::read_json(resp).await?;
        let speeds = self.speeds();

        entries
            .into_iter()
            .map(|mut entry| {
                if let Some(device) = entry.get_mut("device") {
                    speeds.decode_fan_speed(device);
                }
                from_value::<DeviceUser>(entry)
            })
            .collect()
    }

    /// Apply a partial update to one device group.
    ///
    /// `PUT /device?groupID={group_id}` with only the supplied fields.
    /// An empty request sends nothing and returns `Ok(None)`.
    pub async fn control_device(
        &self,
        group_id: &str,
        request: &ControlRequest,
    ) -> Result<Option<Device>, Error> {
        let speeds = self.speeds();
        let Some(body) = request.to_body(&speeds) else {
            debug!(group_id, "empty control request, nothing to send");
            return Ok(None);
        };

        let url = self.url("/device")?;
        debug!(%url, group_id, ?body, "controlling device");

        let resp = self
            .authorize(self.http().put(url).query(&[("groupID", group_id)]).json(&body))?
            .send()
            .await
            .map_err(Error::Transport)?;

        let resp = resp.error_for_status().map_err(api_error)?;

        let mut device: Value = Self::read_json(resp).await?;
        speeds.decode_fan_speed(&mut device);
        from_value(device).map(Some)
    }
}

fn api_error(err: reqwest::Error) -> Error {
    match err.status() {
        Some(status) => Error::Api {
            status,
            source: Some(err),
        },
        None => Error::Transport(err),
    }
}
