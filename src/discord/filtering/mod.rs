// Discord side of the message filters: slash commands, gateway events and
// the serenity-backed enforcement ports.

pub mod commands;
pub mod enforcement;
pub mod events;
pub mod formatter;
