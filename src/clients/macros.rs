/// Generates the read-side client methods shared by every actor-backed store.
///
/// Records are converted into `$entity` through `From`, so a client may wrap a
/// record type that carries extra bookkeeping.
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $entity_name_snake:ident, $plural_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<find_ $entity_name_snake>](
                    &self,
                    id: u64,
                ) -> Result<Option<$entity>, $crate::store::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner
                        .get(id)
                        .await
                        .map(|found| found.map(<$entity>::from))
                        .map_err($crate::store::StoreError::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $plural_snake>](&self) -> Result<Vec<$entity>, $crate::store::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner
                        .list()
                        .await
                        .map(|records| records.into_iter().map(<$entity>::from).collect())
                        .map_err($crate::store::StoreError::from)
                }
            }
        }
    };
}
