pub mod bot_controller;
