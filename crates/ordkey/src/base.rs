use crate::{MalformedSegmentError, OrderKey, Result};
use core::fmt;

/// Platform classes that determine a device's root segment.
///
/// Mobile platforms sort under a separate root so that desktop and mobile
/// bookmark trees merge predictably across a sync chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceRoot {
    /// Root segment `1`: any platform other than iOS or Android.
    Desktop,
    /// Root segment `2`: the `"ios"` and `"android"` platforms.
    Mobile,
}

impl DeviceRoot {
    /// Maps a platform string to its root.
    ///
    /// The match is exact and case-sensitive: only `"ios"` and `"android"`
    /// select [`DeviceRoot::Mobile`]; every other string, including cased
    /// variants like `"iOS"`, is [`DeviceRoot::Desktop`].
    pub fn from_platform(platform: &str) -> Self {
        match platform {
            "ios" | "android" => DeviceRoot::Mobile,
            _ => DeviceRoot::Desktop,
        }
    }

    /// Returns the numeric value used as a key's first segment.
    pub const fn as_u64(self) -> u64 {
        match self {
            DeviceRoot::Desktop => 1,
            DeviceRoot::Mobile => 2,
        }
    }
}

/// Builds the raw base-order prefix for a device: `"{root}.{device_id}."`.
///
/// The root is `2` when `platform` is exactly `"ios"` or `"android"` and `1`
/// otherwise. The result carries a trailing dot: it is the prefix every key
/// generated by the device starts with, not a complete key itself.
///
/// # Example
/// ```
/// use ordkey::base_order;
///
/// assert_eq!(base_order("device123", "ios"), "2.device123.");
/// assert_eq!(base_order("device123", "windows"), "1.device123.");
/// ```
pub fn base_order(device_id: &str, platform: &str) -> String {
    format!(
        "{}.{device_id}.",
        DeviceRoot::from_platform(platform).as_u64()
    )
}

/// The per-device root prefix shared by every order key a device generates.
///
/// Created once when a device registers with the sync chain and immutable
/// thereafter. Unlike the raw [`base_order`] string builder, construction
/// validates the device identifier.
///
/// # Example
/// ```
/// use ordkey::BaseOrder;
///
/// let base = BaseOrder::new("device123", "ios")?;
/// assert_eq!(base.to_string(), "2.device123.");
/// assert_eq!(base.first_child().as_str(), "2.device123.1");
/// # Ok::<(), ordkey::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseOrder {
    root: DeviceRoot,
    device_id: String,
}

impl BaseOrder {
    /// Creates the base order for a device.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::MalformedSegment`] when `device_id` is
    /// empty or contains a `.`, either of which would corrupt the segment
    /// structure of every key built on top of it.
    pub fn new(device_id: &str, platform: &str) -> Result<Self> {
        if device_id.is_empty() || device_id.contains('.') {
            return Err(MalformedSegmentError {
                segment: device_id.to_string(),
                index: 1,
            }
            .into());
        }
        Ok(Self {
            root: DeviceRoot::from_platform(platform),
            device_id: device_id.to_string(),
        })
    }

    /// Returns the device root.
    pub fn root(&self) -> DeviceRoot {
        self.root
    }

    /// Returns the opaque device identifier.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the key assigned to the very first bookmark a device places
    /// in a previously empty sibling list: the base prefix followed by `1`.
    pub fn first_child(&self) -> OrderKey {
        OrderKey::from_parts(format!("{self}1"), 1)
    }
}

impl fmt::Display for BaseOrder {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}.{}.", self.root.as_u64(), self.device_id)
    }
}
