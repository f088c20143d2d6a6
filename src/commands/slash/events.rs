//! Event slash commands: /event, /event_status, /event_cancel_all

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::permissions::Permissions;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Creates event commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_event_command(),
        create_event_status_command(),
        create_event_cancel_all_command(),
    ]
}

/// Creates the event command - posts a poll for the next weekday/hour
fn create_event_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("event")
        .description("Schedule an event poll with a reminder before it starts")
        .create_option(|option| {
            option
                .name("day")
                .description("Day of the week (UTC)")
                .kind(CommandOptionType::String)
                .required(true);
            for day in WEEKDAYS {
                option.add_string_choice(day, day);
            }
            option
        })
        .create_option(|option| {
            option
                .name("hour")
                .description("Hour of the day in UTC (0-23)")
                .kind(CommandOptionType::Integer)
                .required(true)
                .min_int_value(0)
                .max_int_value(23)
        })
        .to_owned()
}

fn create_event_status_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("event_status")
        .description("List scheduled events")
        .to_owned()
}

/// Creates the event_cancel_all command (admin)
fn create_event_cancel_all_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("event_cancel_all")
        .description("Cancel every scheduled event and remove its poll (Admin)")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .to_owned()
}
