use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationNotification {
    NowAiring(String),
    ReminderSet(String),
    ReminderRemoved(String),
    ReminderCreated(String),
}

impl StationNotification {
    pub fn program_name(&self) -> &str {
        match self {
            StationNotification::NowAiring(name)
            | StationNotification::ReminderSet(name)
            | StationNotification::ReminderRemoved(name)
            | StationNotification::ReminderCreated(name) => name,
        }
    }

    pub fn message_text(&self) -> String {
        match self {
            StationNotification::NowAiring(name) => format!("No ar agora: {name}"),
            StationNotification::ReminderSet(name) => format!("Lembrete ativado para \"{name}\""),
            StationNotification::ReminderRemoved(name) => format!("Lembrete removido para \"{name}\""),
            StationNotification::ReminderCreated(name) => format!("Lembrete para \"{name}\" criado!"),
        }
    }
}

#[async_trait]
pub trait NotificationChannel: Send + Sync + 'static {
    async fn send_notification(&self, notification: StationNotification);
}

pub struct LogNotificationChannel;

#[async_trait]
impl NotificationChannel for LogNotificationChannel {
    async fn send_notification(&self, notification: StationNotification) {
        log::info!("{}", notification.message_text());
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_program() {
        let notification = StationNotification::NowAiring("ZONA MISTA".to_owned());

        assert_eq!(notification.message_text(), "No ar agora: ZONA MISTA");
        assert_eq!(notification.program_name(), "ZONA MISTA");
        assert_eq!(
            StationNotification::ReminderCreated("DANCE CLUB".to_owned()).message_text(),
            "Lembrete para \"DANCE CLUB\" criado!"
        );
    }
}
