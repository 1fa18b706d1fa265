//! Control panel state machine
//!
//! One panel exists per opened popup and is bound to the active tab. Every
//! method takes `&self`; state lives in a `RefCell` whose borrows never span an
//! `.await`, so a UI can hold the panel in an `Rc` and fire handlers freely.

use crate::delivery::{deliver, DeliveryOutcome, TabChannel};
use crate::domain::PageDomain;
use crate::error::{Result, SettingsError};
use crate::quantize::snap_volume;
use crate::resolve::resolve;
use soundmaster_core::{
    BoostConfig, Clock, DebugSnapshot, DomainProfiles, PageMessage, PageResponse, ProfileStore,
    SettingsPatch, VolumeProfile, UNITY_PERCENT,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct PanelState {
    global_volume: u32,
    domain_profiles: DomainProfiles,
    custom_buttons: [u32; 3],
    current_volume: u32,
    previous_volume: u32,
    has_profile: bool,
}

/// Popup-side controller for the active tab
pub struct ControlPanel<S, C, K> {
    store: Rc<S>,
    channel: C,
    clock: K,
    config: BoostConfig,
    page: PageDomain,
    state: RefCell<PanelState>,
}

impl<S, C, K> ControlPanel<S, C, K>
where
    S: ProfileStore,
    C: TabChannel,
    K: Clock,
{
    /// Open the panel for the tab at `tab_url`
    ///
    /// A missing or unparsable URL yields an [`PageDomain::Unknown`] page. The
    /// panel still works against the global volume in that case but refuses
    /// per-site writes.
    pub async fn open(
        store: Rc<S>,
        channel: C,
        clock: K,
        config: BoostConfig,
        tab_url: Option<&str>,
    ) -> Result<Self> {
        let page = tab_url.map_or(PageDomain::Unknown, PageDomain::from_url);
        let settings = store.load_all().await?;

        let has_profile = page
            .domain()
            .is_some_and(|domain| settings.domain_profiles.contains(domain.as_str()));
        let current_volume =
            resolve(&page, settings.global_volume, &settings.domain_profiles).percent;

        info!(
            "Panel opened for {} at {}% (profile: {})",
            page.label(),
            current_volume,
            has_profile
        );

        Ok(Self {
            store,
            channel,
            clock,
            config,
            page,
            state: RefCell::new(PanelState {
                global_volume: settings.global_volume,
                domain_profiles: settings.domain_profiles,
                custom_buttons: settings.custom_button_values,
                current_volume,
                previous_volume: UNITY_PERCENT,
                has_profile,
            }),
        })
    }

    pub fn page(&self) -> &PageDomain {
        &self.page
    }

    pub fn config(&self) -> &BoostConfig {
        &self.config
    }

    /// Volume shown on the slider
    pub fn current_volume(&self) -> u32 {
        self.state.borrow().current_volume
    }

    /// Volume the mute toggle restores
    pub fn previous_volume(&self) -> u32 {
        self.state.borrow().previous_volume
    }

    pub fn global_volume(&self) -> u32 {
        self.state.borrow().global_volume
    }

    /// Whether per-site override is enabled for the active domain
    pub fn has_profile(&self) -> bool {
        self.state.borrow().has_profile
    }

    pub fn is_muted(&self) -> bool {
        self.current_volume() == 0
    }

    /// The three editable quick-button values
    pub fn custom_buttons(&self) -> [u32; 3] {
        self.state.borrow().custom_buttons
    }

    /// Quick buttons as displayed: mute followed by the editable ones
    pub fn quick_buttons(&self) -> [u32; 4] {
        let [a, b, c] = self.custom_buttons();
        [0, a, b, c]
    }

    /// Stored profiles, ordered by domain
    pub fn profiles(&self) -> Vec<VolumeProfile> {
        self.state.borrow().domain_profiles.profiles().collect()
    }

    /// Set the volume of the active tab and persist it
    pub async fn set_volume(&self, volume: u32) -> Result<DeliveryOutcome> {
        self.change_volume(volume, true).await
    }

    /// Handle raw slider input; returns the snapped value that was applied
    pub async fn slider_input(&self, raw: u32) -> Result<u32> {
        let volume = snap_volume(raw.min(self.config.max_volume), &self.config.snap);
        self.change_volume(volume, true).await?;
        Ok(volume)
    }

    /// Press a quick button; returns the resulting volume
    ///
    /// The mute button toggles: pressed while muted it restores the
    /// previous volume and leaves the remembered previous volume alone.
    pub async fn press_quick_button(&self, value: u32) -> Result<u32> {
        let (volume, remember_previous) = {
            let state = self.state.borrow();
            if value == 0 && state.current_volume == 0 {
                (state.previous_volume, false)
            } else {
                (value, true)
            }
        };

        self.change_volume(volume, remember_previous).await?;
        Ok(volume)
    }

    /// Toggle per-site override for the active domain
    pub async fn set_override(&self, enabled: bool) -> Result<()> {
        let domain = self
            .page
            .domain()
            .ok_or(SettingsError::UnresolvedDomain)?
            .clone();

        let (patch, global_volume) = {
            let mut state = self.state.borrow_mut();
            state.has_profile = enabled;
            if enabled {
                let volume = state.current_volume;
                state
                    .domain_profiles
                    .create(domain.as_str(), volume, self.clock.now_millis());
                info!("Created profile for {domain} at {volume}%");
            } else {
                state.domain_profiles.remove(domain.as_str());
                info!("Removed profile for {domain}");
            }
            (
                SettingsPatch::domain_profiles(state.domain_profiles.clone()),
                state.global_volume,
            )
        };

        self.store.set(patch).await?;

        if !enabled {
            self.change_volume(global_volume, true).await?;
        }
        Ok(())
    }

    /// Delete a stored profile from the profile manager
    pub async fn delete_profile(&self, domain: &str) -> Result<()> {
        let (patch, revert_to) = {
            let mut state = self.state.borrow_mut();
            if state.domain_profiles.remove(domain).is_none() {
                debug!("No profile stored for {domain}");
            }

            let active = self.page.domain().is_some_and(|d| d.as_str() == domain);
            if active {
                state.has_profile = false;
            }
            (
                SettingsPatch::domain_profiles(state.domain_profiles.clone()),
                active.then_some(state.global_volume),
            )
        };

        self.store.set(patch).await?;

        if let Some(global_volume) = revert_to {
            self.change_volume(global_volume, true).await?;
        }
        Ok(())
    }

    /// Edit one quick-button value; invalid values keep the old one
    pub fn set_custom_button(&self, index: usize, value: u32) -> Result<()> {
        if !self.config.is_valid_button_value(value) {
            return Err(SettingsError::ButtonValue {
                value,
                max: self.config.max_volume,
            });
        }

        let mut state = self.state.borrow_mut();
        let slot = state
            .custom_buttons
            .get_mut(index)
            .ok_or(SettingsError::ButtonIndex(index))?;
        *slot = value;
        Ok(())
    }

    /// Persist the edited quick-button values
    pub async fn save_custom_buttons(&self) -> Result<()> {
        let buttons = self.custom_buttons();
        self.store
            .set(SettingsPatch::custom_button_values(buttons))
            .await?;
        debug!("Saved quick buttons {buttons:?}");
        Ok(())
    }

    /// Ask the page agent for diagnostics; `None` when no agent answers
    pub async fn request_debug_info(&self) -> Option<DebugSnapshot> {
        match self.channel.send(&PageMessage::DebugInfo).await {
            Ok(PageResponse::DebugInfo(snapshot)) => Some(snapshot),
            Ok(other) => {
                debug!("Unexpected reply to debug request: {other:?}");
                None
            }
            Err(e) => {
                debug!("Debug request failed: {e}");
                None
            }
        }
    }

    async fn change_volume(&self, volume: u32, remember_previous: bool) -> Result<DeliveryOutcome> {
        // Persist before delivering so overlapping changes are stored in call order
        let patch = {
            let mut state = self.state.borrow_mut();
            if remember_previous && state.current_volume != volume {
                state.previous_volume = state.current_volume;
            }
            state.current_volume = volume;

            match self.page.domain() {
                Some(domain) if state.has_profile => {
                    state
                        .domain_profiles
                        .upsert(domain.as_str(), volume, self.clock.now_millis());
                    SettingsPatch::domain_profiles(state.domain_profiles.clone())
                }
                _ => {
                    state.global_volume = volume;
                    SettingsPatch::global_volume(volume)
                }
            }
        };
        self.store.set(patch).await?;

        let outcome = deliver(
            &self.channel,
            &self.clock,
            &PageMessage::SetVolume { volume },
            self.config.timing.retry_delay(),
        )
        .await;
        if !outcome.is_delivered() {
            debug!("Volume {volume}% not delivered to {}", self.page.label());
        }
        Ok(outcome)
    }
}
