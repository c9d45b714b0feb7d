//! Engine sound channels — по одному на VehicleFamily
//!
//! Политика: активен максимум один канал. Когда last relevant меняется
//! (или очищается), оба канала останавливаются — toggle дальше влияет только
//! на канал новой цели.

use bevy::prelude::*;

use crate::components::VehicleFamily;
use crate::logger;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

#[derive(Resource, Debug, Default)]
pub struct AudioMixer {
    channels: [PlaybackState; 2],
}

impl AudioMixer {
    pub fn state(&self, channel: VehicleFamily) -> PlaybackState {
        self.channels[channel.index()]
    }

    pub fn is_playing(&self, channel: VehicleFamily) -> bool {
        self.state(channel) == PlaybackState::Playing
    }

    pub fn play(&mut self, channel: VehicleFamily) {
        self.channels[channel.index()] = PlaybackState::Playing;
    }

    pub fn stop(&mut self, channel: VehicleFamily) {
        self.channels[channel.index()] = PlaybackState::Stopped;
    }

    /// Play ↔ Stop, возвращает новое состояние
    pub fn toggle(&mut self, channel: VehicleFamily) -> PlaybackState {
        let next = match self.state(channel) {
            PlaybackState::Playing => PlaybackState::Stopped,
            PlaybackState::Stopped => PlaybackState::Playing,
        };
        self.channels[channel.index()] = next;
        logger::log_info(&format!("🔊 {} engine sound: {:?}", channel, next));
        next
    }

    pub fn stop_all(&mut self) {
        if self.channels.contains(&PlaybackState::Playing) {
            logger::log("Stopping all engine sound channels");
        }
        for family in VehicleFamily::ALL {
            self.stop(family);
        }
    }

    pub fn playing_count(&self) -> usize {
        self.channels
            .iter()
            .filter(|state| **state == PlaybackState::Playing)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_stop_all() {
        let mut mixer = AudioMixer::default();
        assert_eq!(mixer.toggle(VehicleFamily::CarA), PlaybackState::Playing);
        assert!(mixer.is_playing(VehicleFamily::CarA));
        assert!(!mixer.is_playing(VehicleFamily::CarB));

        mixer.stop_all();
        assert_eq!(mixer.playing_count(), 0);

        mixer.toggle(VehicleFamily::CarB);
        assert_eq!(mixer.toggle(VehicleFamily::CarB), PlaybackState::Stopped);
    }
}
