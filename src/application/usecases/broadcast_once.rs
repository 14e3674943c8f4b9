use crate::application::{BroadcastTargetStore, ContentProvider, DeliveryDispatcher};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub targets: usize,
    pub delivered: usize,
    pub failed: usize,
    pub skipped_purposes: usize,
}

/// One broadcast tick over every configured purpose.
///
/// Nothing here fails the tick: a purpose whose targets or content cannot be
/// produced is skipped, and a failed delivery only skips that target.
pub struct BroadcastOnceUseCase<'a> {
    pub targets: &'a dyn BroadcastTargetStore,
    pub content: &'a dyn ContentProvider,
    pub dispatcher: &'a DeliveryDispatcher,
    pub purposes: &'a [String],
}

impl<'a> BroadcastOnceUseCase<'a> {
    pub async fn execute(&self) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for purpose in self.purposes {
            let targets = match self.targets.list_by_purpose(purpose).await {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(purpose = %purpose, "failed to list broadcast targets: {e}");
                    report.skipped_purposes += 1;
                    continue;
                }
            };
            if targets.is_empty() {
                tracing::debug!(purpose = %purpose, "no broadcast targets registered");
                continue;
            }

            let content = match self.content.generate(purpose).await {
                Ok(Some(c)) => c,
                Ok(None) => {
                    tracing::info!(purpose = %purpose, "no content to broadcast");
                    report.skipped_purposes += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(purpose = %purpose, "content generation failed: {e}");
                    report.skipped_purposes += 1;
                    continue;
                }
            };

            for target in targets {
                report.targets += 1;
                let destination = target.destination();
                match self.dispatcher.deliver(&destination, &content).await {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        tracing::warn!(
                            purpose = %purpose,
                            destination = %destination,
                            "broadcast skipped for this tick: {e}"
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        report
    }
}
