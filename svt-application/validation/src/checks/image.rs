//! 磁盘镜像导入检查

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use svt_cluster::{
    has_condition, DiskImageSpec, ImageBackend, ImageSourceType, IMAGE_IMPORTED_CONDITION,
};
use svt_engine::{wait_until_ready, Check, RunContext};

use super::CheckEnv;

/// 从配置的下载地址创建磁盘镜像并等待导入完成
///
/// 镜像后端按存储引擎分流：Longhorn v1 引擎使用镜像后备文件，
/// 其余引擎走数据卷导入。导入完成的镜像供虚拟机检查作为系统盘。
pub struct ImageCheck {
    env: Arc<CheckEnv>,
}

impl ImageCheck {
    pub fn new(env: Arc<CheckEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Check for ImageCheck {
    fn name(&self) -> &str {
        "ensure vm image creation is successful"
    }

    async fn execute(&self, ctx: &RunContext) -> Result<()> {
        let config = &self.env.config;
        let backend = if self.env.longhorn_v1 {
            ImageBackend::BackingImage
        } else {
            ImageBackend::Cdi
        };

        let image = self
            .env
            .client
            .image()
            .create(
                &config.namespace,
                "validator-image-",
                DiskImageSpec {
                    display_name: "storage validation image".to_string(),
                    url: config.image_url.clone(),
                    source_type: ImageSourceType::Download,
                    target_storage_policy: config.storage_class.clone(),
                    backend,
                    retry: 3,
                },
            )
            .await?;
        self.env.tracker.register(image.clone());

        let image_api = self.env.client.image();
        wait_until_ready(ctx, &image, || image_api.get(&image), |i| {
            Ok(has_condition(&i.status.conditions, IMAGE_IMPORTED_CONDITION))
        })
        .await?;

        self.env.set_image(&image.name);
        Ok(())
    }
}
