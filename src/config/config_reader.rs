// ==========================================
// 班次排班系统 - 排班配置读取 Trait
// ==========================================
// 职责: 定义排班所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::schedule_config::ScheduleConfig;
use async_trait::async_trait;

// ==========================================
// ScheduleConfigReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 表）、ScheduleConfig（固定值）
#[async_trait]
pub trait ScheduleConfigReader: Send + Sync {
    /// 获取周配额
    ///
    /// # 默认值
    /// - 5
    async fn get_weekly_limit(&self) -> ConfigResult<u32>;

    /// 是否严格时段匹配
    ///
    /// # 默认值
    /// - true
    async fn get_strict_hours(&self) -> ConfigResult<bool>;

    /// 专项班次标记别名，逗号分隔（类别文本包含任一别名即生效）
    ///
    /// # 默认值
    /// - "ATAN,אט"
    async fn get_specialized_marker(&self) -> ConfigResult<String>;

    /// 专项班次要求的资质标签
    ///
    /// # 默认值
    /// - "ATAN"
    async fn get_certification_tag(&self) -> ConfigResult<String>;

    /// 读取完整排班配置并校验
    async fn load_schedule_config(&self) -> ConfigResult<ScheduleConfig> {
        let config = ScheduleConfig {
            weekly_limit: self.get_weekly_limit().await?,
            strict_hours: self.get_strict_hours().await?,
            specialized_marker: self.get_specialized_marker().await?,
            certification_tag: self.get_certification_tag().await?,
        };
        config.validate()?;
        Ok(config)
    }
}

// 固定配置（命令行参数 / 测试）
#[async_trait]
impl ScheduleConfigReader for ScheduleConfig {
    async fn get_weekly_limit(&self) -> ConfigResult<u32> {
        Ok(self.weekly_limit)
    }

    async fn get_strict_hours(&self) -> ConfigResult<bool> {
        Ok(self.strict_hours)
    }

    async fn get_specialized_marker(&self) -> ConfigResult<String> {
        Ok(self.specialized_marker.clone())
    }

    async fn get_certification_tag(&self) -> ConfigResult<String> {
        Ok(self.certification_tag.clone())
    }
}
